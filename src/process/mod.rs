//! Process memory map modules.
//!
//! This module provides:
//! - `maps`: Parsing of /proc/<pid>/maps records
//! - `classifier`: Region categorisation
//! - `catalog`: Parse + classify over a whole listing
//! - `memory`: Region reads from /proc/<pid>/mem
//! - `strings`: Printable string extraction
//! - `scanner`: Process discovery for listings

pub mod catalog;
pub mod classifier;
pub mod maps;
pub mod memory;
pub mod scanner;
pub mod strings;

// Re-export commonly used types
pub use catalog::RegionCatalog;
pub use classifier::{classify, classify_region, Category};
pub use maps::{parse_map_line, AddressRange, Region};
pub use memory::{read_region, MemoryImage, ProcMemory, RegionChunk, SkipReason};
pub use scanner::{collect_proc_entries, list_processes, ProcEntry, ProcessInfo};
pub use strings::{
    effective_min_length, extract_strings, preview_strings, PrintableStrings,
    DEFAULT_MIN_STRING_LENGTH,
};
