//! CLI command implementations for omnidump.
//!
//! This module provides implementations for all CLI subcommands:
//! - `dump`: Region classification and extraction for one process
//! - `show`: Process listing
//! - `check`: System validation
//! - `config`: Configuration file generation

pub mod check;
pub mod config;
pub mod dump;
pub mod show;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use dump::command_dump;
pub use show::command_show;
