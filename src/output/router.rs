//! Top-level dump entry points and output mode dispatch.

use std::io::Write;

use tracing::{debug, info};

use crate::dump_config::{DumpConfig, OutputMode};
use crate::error::DumpError;
use crate::output::console::write_console;
use crate::output::sections::{write_sections, SectionFormat};
use crate::output::unclassified::write_unclassified_log;
use crate::output::{say, DumpReport, FileSink, FsSink};
use crate::process::{Category, MemoryImage, ProcMemory, RegionCatalog};

/// Routes a built catalog to the configured output mode.
///
/// Fails only when the configuration is inconsistent or the memory image
/// cannot be opened; per-region problems are counted in the report.
pub fn dump_regions<M, S, W>(
    catalog: &RegionCatalog,
    config: &DumpConfig,
    memory: &M,
    sink: &S,
    out: &mut W,
) -> Result<DumpReport, DumpError>
where
    M: MemoryImage,
    S: FileSink,
    W: Write,
{
    config.validate()?;
    debug!("Dumping with mode {:?}", config.mode);

    let report = match config.mode {
        OutputMode::Console => write_console(catalog, config, memory, out)?,
        OutputMode::UnclassifiedLog => write_unclassified_log(catalog, config, memory, sink, out)?,
        OutputMode::SectionBinary => {
            write_sections(catalog, config, SectionFormat::Binary, memory, sink, out)?
        }
        OutputMode::SectionStrings => {
            write_sections(catalog, config, SectionFormat::Strings, memory, sink, out)?
        }
    };

    let unclassified = catalog.regions(Category::None).len();
    if config.mode.shows_unclassified_hint() && unclassified > 0 {
        say(out, format_args!("\n{} unclassified memory regions found", unclassified));
        say(out, format_args!("Use '--unclassified' to print them."));
        say(out, format_args!("Use '--log-unclassified' to save them to a log file."));
    }

    info!(
        "Dump finished: {} written, {} skipped, {} failed",
        report.written, report.skipped, report.failed
    );
    Ok(report)
}

/// Dumps a live process through procfs and the real filesystem.
pub fn dump_process<W: Write>(config: &DumpConfig, out: &mut W) -> Result<DumpReport, DumpError> {
    config.validate()?;
    let catalog = RegionCatalog::load(&config.maps_path())?;
    info!(
        "Loaded {} regions from {} ({} lines rejected)",
        catalog.total_regions(),
        config.maps_path().display(),
        catalog.rejected_lines()
    );
    let memory = ProcMemory::new(config.mem_path());
    debug!("Reading region contents from {}", memory.path().display());
    dump_regions(&catalog, config, &memory, &FsSink, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump_config::SectionSelection;
    use crate::output::testing::{MemorySink, VecImage};
    use std::path::PathBuf;

    const MAPS: &str = "\
00000010-00000020 rw-p 00000000 00:00 0    [heap]
00000020-00000030 r-xp 00000000 08:01 42   /usr/lib/libc.so.6
00000030-00000040 r--p 00000000 00:00 0    [uprobes]
";

    struct FailingImage;

    impl MemoryImage for FailingImage {
        type Handle = std::io::Cursor<Vec<u8>>;

        fn open(&self) -> Result<Self::Handle, DumpError> {
            Err(DumpError::PermissionDenied {
                path: PathBuf::from("/proc/1/mem"),
            })
        }
    }

    #[test]
    fn test_console_with_unclassified_hint() {
        let catalog = RegionCatalog::build(MAPS.lines());
        let config = DumpConfig {
            sections: SectionSelection::only([Category::Heap, Category::SharedLibs]),
            ..Default::default()
        };
        let mut out = Vec::new();

        let report = dump_regions(
            &catalog,
            &config,
            &VecImage::with_len(0x40),
            &MemorySink::default(),
            &mut out,
        )
        .unwrap();

        assert_eq!(report.written, 2);
        let text = String::from_utf8(out).unwrap();
        let libs = text.find("--- SHARED_LIBS SECTIONS ---").unwrap();
        let heap = text.find("--- HEAP SECTIONS ---").unwrap();
        assert!(libs < heap);
        assert!(text.contains("1 unclassified memory regions found"));
        assert!(text.contains("Use '--log-unclassified'"));
    }

    #[test]
    fn test_binary_mode_has_no_hint() {
        let catalog = RegionCatalog::build(MAPS.lines());
        let config = DumpConfig {
            sections: SectionSelection::only([Category::Heap]),
            mode: OutputMode::SectionBinary,
            save_dir: Some(PathBuf::from("/out")),
            ..Default::default()
        };
        let mut out = Vec::new();

        dump_regions(
            &catalog,
            &config,
            &VecImage::with_len(0x40),
            &MemorySink::default(),
            &mut out,
        )
        .unwrap();

        assert!(!String::from_utf8(out).unwrap().contains("unclassified"));
    }

    #[test]
    fn test_invalid_config_is_rejected_before_output() {
        let catalog = RegionCatalog::build(MAPS.lines());
        let config = DumpConfig {
            sections: SectionSelection::all(),
            mode: OutputMode::SectionStrings,
            ..Default::default()
        };
        let sink = MemorySink::default();
        let mut out = Vec::new();

        let err = dump_regions(&catalog, &config, &VecImage::with_len(0x40), &sink, &mut out)
            .unwrap_err();
        assert!(matches!(err, DumpError::InvalidConfig(_)));
        assert!(out.is_empty());
        assert!(sink.dirs.borrow().is_empty());
    }

    #[test]
    fn test_unopenable_memory_is_fatal() {
        let catalog = RegionCatalog::build(MAPS.lines());
        let config = DumpConfig {
            sections: SectionSelection::only([Category::Heap]),
            ..Default::default()
        };
        let mut out = Vec::new();

        let err = dump_regions(&catalog, &config, &FailingImage, &MemorySink::default(), &mut out)
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_missing_process_is_fatal() {
        let config = DumpConfig {
            target: crate::dump_config::Target::Pid(u32::MAX),
            proc_root: PathBuf::from("/nonexistent-proc-root"),
            sections: SectionSelection::all(),
            ..Default::default()
        };
        let err = dump_process(&config, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, DumpError::SourceNotFound { .. }));
    }
}
