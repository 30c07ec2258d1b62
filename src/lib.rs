//! Omnidump Memory Region Library
//!
//! This library parses a process memory map listing, classifies every region
//! into a semantic category and extracts region contents from the process
//! memory image. It is designed to be driven by the `omnidump` binary but the
//! core pieces work on any text listing and any seekable byte source.
//!
//! # Features
//!
//! - **Map Parsing**: Strict field validation of `/proc/<pid>/maps` records
//! - **Classification**: Fourteen ordered categories, from `heap` to `none`
//! - **Extraction**: Per-region reads with unreadable and empty regions skipped
//! - **Output Routing**: Console listing, per-section binary or strings files,
//!   and a timestamped log of unclassified regions
//!
//! # Usage
//!
//! ```rust
//! use omnidump::process::{classify_region, parse_map_line, Category};
//!
//! let region = parse_map_line(
//!     "7ffc1a2b3000-7ffc1a2d4000 rw-p 00000000 00:00 0    [stack]",
//! )
//! .unwrap();
//!
//! assert_eq!(region.size(), 0x21000);
//! assert_eq!(classify_region(&region), Category::Stack);
//! ```

pub mod dump_config;
pub mod error;
pub mod output;
pub mod process;

// Re-export main types for convenience
pub use dump_config::{DumpConfig, OutputMode, SectionSelection, Target};
pub use error::{DumpError, MapParseError};
pub use output::{dump_process, dump_regions, DumpReport, FileSink, FsSink};
pub use process::{Category, Region, RegionCatalog};
