//! Error taxonomy for map parsing and memory extraction.
//!
//! Per-line and per-region failures are recovered where they happen; only
//! the inability to open the maps listing or the memory image stops a dump.

use std::io;
use std::path::{Path, PathBuf};

use crate::process::AddressRange;

/// Reasons a single maps line is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapParseError {
    #[error("missing {0} field")]
    MissingField(&'static str),

    #[error("invalid address format: {0}")]
    InvalidAddress(String),

    #[error("invalid permissions: {0}")]
    InvalidPermissions(String),

    #[error("invalid offset: {0}")]
    InvalidOffset(String),

    #[error("invalid device id: {0}")]
    InvalidDevice(String),

    #[error("invalid inode: {0}")]
    InvalidInode(String),
}

/// Failures raised while dumping a process.
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    #[error("{} not found (has the process exited?)", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("permission denied opening {} (run with sudo or CAP_SYS_PTRACE)", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("cannot open {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not read region {range}: {source}")]
    Read {
        range: AddressRange,
        #[source]
        source: io::Error,
    },

    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid dump configuration: {0}")]
    InvalidConfig(String),
}

impl DumpError {
    /// Classifies a failure to open one of the two top-level sources.
    pub fn open_failure(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => DumpError::SourceNotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => DumpError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => DumpError::SourceUnavailable {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    pub fn write(path: &Path, source: io::Error) -> Self {
        DumpError::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True for the failures that abort a whole dump invocation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DumpError::SourceNotFound { .. }
                | DumpError::PermissionDenied { .. }
                | DumpError::SourceUnavailable { .. }
                | DumpError::InvalidConfig(_)
        )
    }
}
