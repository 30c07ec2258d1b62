//! Timestamped log of regions that matched no category.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, error, warn};

use crate::dump_config::DumpConfig;
use crate::error::DumpError;
use crate::output::console::{format_region_block, Detail};
use crate::output::{read_or_record, say, DumpReport, FileSink, LazyImage};
use crate::process::{preview_strings, Category, MemoryImage, RegionCatalog};

/// File name for one run's log, e.g. `omnidump-2024-05-01_12-30-00-unclassified-regions.log`.
pub fn log_file_name(now: DateTime<Local>) -> String {
    format!(
        "omnidump-{}-unclassified-regions.log",
        now.format("%Y-%m-%d_%H-%M-%S")
    )
}

/// Runs sharing one timestamp get a numbered name instead of replacing each other's log.
const MAX_LOG_NAME_ATTEMPTS: usize = 100;

/// Log name for the `attempt`-th run started within the same second.
fn numbered_log_file_name(now: DateTime<Local>, attempt: usize) -> String {
    let name = log_file_name(now);
    if attempt == 0 {
        return name;
    }
    match name.strip_suffix(".log") {
        Some(stem) => format!("{}-{}.log", stem, attempt),
        None => format!("{}-{}", name, attempt),
    }
}

/// Creates a log under `dest` that does not clobber an existing file.
pub fn create_unique_log<S: FileSink>(
    sink: &S,
    dest: &Path,
    now: DateTime<Local>,
) -> Result<(PathBuf, Box<dyn Write>), (PathBuf, io::Error)> {
    let mut last = dest.join(log_file_name(now));
    for attempt in 0..MAX_LOG_NAME_ATTEMPTS {
        let path = dest.join(numbered_log_file_name(now, attempt));
        match sink.create_log(&path) {
            Ok(log) => return Ok((path, log)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!("{} already exists", path.display());
                last = path;
            }
            Err(e) => return Err((path, e)),
        }
    }
    Err((last, io::Error::from(io::ErrorKind::AlreadyExists)))
}

/// Writes every `none` region to a new log file under the save directory.
pub fn write_unclassified_log<M: MemoryImage, S: FileSink, W: Write>(
    catalog: &RegionCatalog,
    config: &DumpConfig,
    memory: &M,
    sink: &S,
    out: &mut W,
) -> Result<DumpReport, DumpError> {
    let dest = config.destination()?;
    let regions = catalog.regions(Category::None);
    let mut report = DumpReport::default();

    if regions.is_empty() {
        warn!("No unclassified regions found to save");
        say(out, format_args!("No unclassified regions found to save."));
        return Ok(report);
    }

    let mut image = LazyImage::new(memory);
    let mem = image.get()?;

    if let Err(e) = sink.create_dir_all(dest) {
        error!("{}", DumpError::write(dest, e));
        report.failed = regions.len();
        return Ok(report);
    }

    let (log_path, mut log) = match create_unique_log(sink, dest, Local::now()) {
        Ok(created) => created,
        Err((log_path, e)) => {
            error!("{}", DumpError::write(&log_path, e));
            report.failed = regions.len();
            return Ok(report);
        }
    };

    if let Err(e) = writeln!(log, "Unclassified Memory Regions:") {
        error!("{}", DumpError::write(&log_path, e));
        report.failed = regions.len();
        return Ok(report);
    }

    for (idx, region) in regions.iter().enumerate() {
        let Some(chunk) = read_or_record(region, mem, &mut report) else {
            continue;
        };
        let detail = if config.verbose {
            Detail::Verbose(preview_strings(&chunk, config.min_string_length))
        } else {
            Detail::Basic
        };
        let block = format_region_block(idx + 1, region, chunk.len(), &detail);
        match writeln!(log, "{}", block) {
            Ok(()) => report.written += 1,
            Err(e) => {
                warn!("Region {}: {}", region.range, DumpError::write(&log_path, e));
                report.failed += 1;
            }
        }
    }

    if let Err(e) = log.flush() {
        error!("{}", DumpError::write(&log_path, e));
        report.failed += report.written;
        report.written = 0;
        return Ok(report);
    }

    say(
        out,
        format_args!(
            "Successfully saved {} unclassified region(s) to '{}'.",
            report.written,
            log_path.display()
        ),
    );
    Ok(report)
}
