//! CLI arguments and subcommands for omnidump.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use omnidump::process::Category;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "omnidump",
    about = "Classify and dump the memory regions of a Linux process",
    long_about = "Classify and dump the memory regions of a Linux process.\n\n\
                  Reads /proc/<pid>/maps, sorts every mapping into a semantic category \
                  (heap, stack, shared libraries, guard pages, ...) and extracts region \
                  contents from /proc/<pid>/mem to the console, to per-region binary or \
                  strings files, or to a log of unclassified regions.",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("VERGEN_BUILD_DATE"), ")"),
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level (diagnostics go to stderr)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,
}

/// One flag per region category.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct SectionFlags {
    /// Select executable sections
    #[arg(short = 'e', long)]
    pub executable: bool,

    /// Select shared library sections
    #[arg(long)]
    pub shared_libs: bool,

    /// Select heap sections
    #[arg(long)]
    pub heap: bool,

    /// Select stack sections
    #[arg(long)]
    pub stack: bool,

    /// Select vvar sections
    #[arg(long)]
    pub vvar: bool,

    /// Select vsyscall sections
    #[arg(long)]
    pub vsyscall: bool,

    /// Select vdso sections
    #[arg(long)]
    pub vdso: bool,

    /// Select named anonymous sections ([anon:...])
    #[arg(long)]
    pub anon: bool,

    /// Select guard page sections
    #[arg(long)]
    pub guard_pages: bool,

    /// Select file backed sections
    #[arg(long)]
    pub file_backed: bool,

    /// Select tmpfs or shared memory sections
    #[arg(long)]
    pub tmpfs_shm: bool,

    /// Select device mapped sections
    #[arg(long)]
    pub device_mappings: bool,

    /// Select unnamed anonymous mappings
    #[arg(long)]
    pub anon_map: bool,

    /// Select sections that could not be classified
    #[arg(long)]
    pub unclassified: bool,
}

impl SectionFlags {
    /// Categories whose flag is set, in display order.
    pub fn categories(&self) -> Vec<Category> {
        let flags = [
            (self.executable, Category::Executable),
            (self.shared_libs, Category::SharedLibs),
            (self.heap, Category::Heap),
            (self.stack, Category::Stack),
            (self.vvar, Category::Vvar),
            (self.vsyscall, Category::Vsyscall),
            (self.vdso, Category::Vdso),
            (self.anon, Category::Anon),
            (self.guard_pages, Category::GuardPages),
            (self.file_backed, Category::FileBacked),
            (self.tmpfs_shm, Category::TmpfsShm),
            (self.device_mappings, Category::DeviceMappings),
            (self.anon_map, Category::AnonMap),
            (self.unclassified, Category::None),
        ];
        flags
            .into_iter()
            .filter_map(|(set, category)| set.then_some(category))
            .collect()
    }
}

/// Options of the `dump` subcommand.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct DumpArgs {
    /// Process ID to dump
    pub pid: Option<u32>,

    /// Dump the omnidump process itself
    #[arg(long = "self")]
    pub current: bool,

    #[command(flatten)]
    pub sections: SectionFlags,

    /// Select every section except unclassified ones
    #[arg(long)]
    pub all: bool,

    /// Show permissions, inode, device and a string preview per region
    #[arg(long)]
    pub verbose: bool,

    /// Show a string preview per region
    #[arg(long)]
    pub strings: bool,

    /// Minimum printable string length (default 4)
    #[arg(long, allow_negative_numbers = true)]
    pub length: Option<i64>,

    /// Directory to save files to
    #[arg(long)]
    pub save_dir: Option<PathBuf>,

    /// Save unclassified regions to a timestamped log file
    #[arg(long)]
    pub log_unclassified: bool,

    /// Save each selected region as a binary file
    #[arg(long)]
    pub log_sections: bool,

    /// Save the strings of each selected region to a text file
    #[arg(long)]
    pub log_strings: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dump memory regions of a process
    Dump(DumpArgs),

    /// List running processes
    Show {
        /// Filter by owner name
        #[arg(long)]
        owner: Option<String>,
    },

    /// Validate configuration and system requirements
    Check,

    /// Generate configuration files
    Config {
        /// Output file path
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },
}
