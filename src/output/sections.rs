//! Per-section file output: raw `.bin` dumps and `-strings.txt` extractions.
//!
//! Each selected category gets its own directory under the save directory,
//! and each region its own file named after its address range.

use std::io::{Read, Seek, Write};
use std::path::Path;

use tracing::{error, warn};

use crate::dump_config::DumpConfig;
use crate::error::DumpError;
use crate::output::{read_or_record, say, DumpReport, FileSink, LazyImage};
use crate::process::{extract_strings, Category, MemoryImage, Region, RegionCatalog};

/// What to write for each region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionFormat {
    Binary,
    Strings,
}

impl SectionFormat {
    pub fn file_name(self, region: &Region) -> String {
        match self {
            SectionFormat::Binary => format!("{}.bin", region.range.file_stem()),
            SectionFormat::Strings => format!("{}-strings.txt", region.range.file_stem()),
        }
    }
}

/// Text body of a strings file.
pub fn format_strings_file(region: &Region, strings: &[String]) -> String {
    let mut text = format!(
        "--Extracted Strings-- {} {} ({} found)\n",
        region.range,
        region.path,
        strings.len()
    );
    for s in strings {
        text.push_str(s);
        text.push('\n');
    }
    text
}

fn write_region<R: Read + Seek, S: FileSink>(
    region: &Region,
    mem: &mut R,
    sink: &S,
    dir: &Path,
    format: SectionFormat,
    min_string_length: Option<usize>,
    report: &mut DumpReport,
) {
    let Some(chunk) = read_or_record(region, mem, report) else {
        return;
    };

    let path = dir.join(format.file_name(region));
    let result = match format {
        SectionFormat::Binary => sink.write_bytes(&path, &chunk),
        SectionFormat::Strings => {
            let strings: Vec<String> = extract_strings(&chunk, min_string_length).collect();
            sink.write_text(&path, &format_strings_file(region, &strings))
        }
    };

    match result {
        Ok(()) => report.written += 1,
        Err(e) => {
            warn!("{}", DumpError::write(&path, e));
            report.failed += 1;
        }
    }
}

/// Writes one file per region of every selected category.
pub fn write_sections<M: MemoryImage, S: FileSink, W: Write>(
    catalog: &RegionCatalog,
    config: &DumpConfig,
    format: SectionFormat,
    memory: &M,
    sink: &S,
    out: &mut W,
) -> Result<DumpReport, DumpError> {
    let dest = config.destination()?;
    let mut image = LazyImage::new(memory);
    let mut report = DumpReport::default();

    for category in config.sections.resolve() {
        let regions = catalog.regions(category);
        if regions.is_empty() {
            warn!("No regions found for section '{}'", category);
            say(out, format_args!("No regions found for section '{}'.", category));
            continue;
        }

        let section_dir = dest.join(category.as_str());
        if let Err(e) = sink.create_dir_all(&section_dir) {
            error!("{}", DumpError::write(&section_dir, e));
            report.failed += regions.len();
            continue;
        }

        let mem = image.get()?;
        let mut section = DumpReport::default();
        for region in regions {
            write_region(
                region,
                mem,
                sink,
                &section_dir,
                format,
                config.min_string_length,
                &mut section,
            );
        }

        report_section(out, category, format, &section, &section_dir);
        report.merge(section);
    }

    Ok(report)
}

fn report_section<W: Write>(
    out: &mut W,
    category: Category,
    format: SectionFormat,
    section: &DumpReport,
    dir: &Path,
) {
    match format {
        SectionFormat::Binary => say(
            out,
            format_args!(
                "Successfully saved {} region(s) of section '{}' to '{}'.",
                section.written,
                category,
                dir.display()
            ),
        ),
        // Strings output only reports sections that produced files
        SectionFormat::Strings if section.written > 0 => say(
            out,
            format_args!(
                "Successfully saved strings of {} region(s) of section '{}' to '{}'.",
                section.written,
                category,
                dir.display()
            ),
        ),
        SectionFormat::Strings => {}
    }
    if section.failed > 0 {
        say(
            out,
            format_args!("{} region(s) of section '{}' could not be saved.", section.failed, category),
        );
    }
}
