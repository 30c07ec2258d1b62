//! Console listing of selected sections.

use std::io::Write;

use tracing::warn;

use crate::dump_config::DumpConfig;
use crate::error::DumpError;
use crate::output::{read_or_record, say, DumpReport, LazyImage};
use crate::process::{preview_strings, MemoryImage, Region, RegionCatalog};

/// How much of a region to describe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detail {
    Basic,
    /// Basic fields plus a string preview.
    Strings(Vec<String>),
    /// Every field plus a string preview.
    Verbose(Vec<String>),
}

impl Detail {
    /// Chooses the detail level for a chunk from the verbose/strings flags.
    pub fn for_chunk(config: &DumpConfig, chunk: &[u8]) -> Self {
        if config.verbose {
            Detail::Verbose(preview_strings(chunk, config.min_string_length))
        } else if config.strings {
            Detail::Strings(preview_strings(chunk, config.min_string_length))
        } else {
            Detail::Basic
        }
    }
}

/// Formats the text block describing one region.
pub fn format_region_block(index: usize, region: &Region, chunk_len: usize, detail: &Detail) -> String {
    match detail {
        Detail::Verbose(strings) => format!(
            "{}: Chunk Size: {} bytes\n Path: {}\n Permissions: {}\n Inode: {}\n Address Range: ({})\n Major Minor Id: {}\n Extracted Strings: {:?}\n",
            index, chunk_len, region.path, region.permissions, region.inode, region.range, region.device, strings
        ),
        Detail::Strings(strings) => format!(
            "{}: Chunk Size: {} bytes\n Path: {}\n Address Range: ({})\n Extracted Strings: {:?}\n",
            index, chunk_len, region.path, region.range, strings
        ),
        Detail::Basic => format!(
            "{}: Chunk Size: {} bytes\n Path: {}\n Address Range: ({})\n",
            index, chunk_len, region.path, region.range
        ),
    }
}

/// Prints every selected section with one block per readable region.
pub fn write_console<M: MemoryImage, W: Write>(
    catalog: &RegionCatalog,
    config: &DumpConfig,
    memory: &M,
    out: &mut W,
) -> Result<DumpReport, DumpError> {
    let mut report = DumpReport::default();

    let sections = config.sections.resolve();
    if sections.is_empty() {
        say(out, format_args!("No memory regions were selected for console output."));
        return Ok(report);
    }

    let mut image = LazyImage::new(memory);

    for category in sections {
        let regions = catalog.regions(category);
        if regions.is_empty() {
            say(out, format_args!("\n--- {} SECTIONS (No entries) ---\n", category.header()));
            continue;
        }
        say(out, format_args!("\n--- {} SECTIONS ---\n", category.header()));

        let mem = image.get()?;
        for (idx, region) in regions.iter().enumerate() {
            let Some(chunk) = read_or_record(region, mem, &mut report) else {
                continue;
            };
            let detail = Detail::for_chunk(config, &chunk);
            let block = format_region_block(idx + 1, region, chunk.len(), &detail);
            if let Err(e) = writeln!(out, "{}", block) {
                warn!("Failed to print region {}: {}", region.range, e);
                report.failed += 1;
                continue;
            }
            report.written += 1;
        }
    }

    Ok(report)
}
