//! Filesystem access for the file-writing output modes.

use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Destination for dump files.
pub trait FileSink {
    /// Creates a directory and any missing parents; existing directories are fine.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Creates or truncates `path` with `bytes` as its content.
    fn write_bytes(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;

    fn write_text(&self, path: &Path, text: &str) -> io::Result<()> {
        self.write_bytes(path, text.as_bytes())
    }

    /// Creates a new log file for incremental writes.
    ///
    /// Fails with [`io::ErrorKind::AlreadyExists`] instead of replacing an existing file.
    fn create_log(&self, path: &Path) -> io::Result<Box<dyn Write>>;
}

/// [`FileSink`] over the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSink;

impl FileSink for FsSink {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn write_bytes(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        fs::write(path, bytes)
    }

    fn create_log(&self, path: &Path) -> io::Result<Box<dyn Write>> {
        let file = OpenOptions::new().write(true).create_new(true).open(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_fs_sink_writes_nested_files() {
        let dir = tempdir().expect("Failed to create temp dir");
        let nested = dir.path().join("out").join("heap");

        FsSink.create_dir_all(&nested).unwrap();
        // Creating an existing directory is not an error
        FsSink.create_dir_all(&nested).unwrap();

        let file = nested.join("region-0x0-0x4.bin");
        FsSink.write_bytes(&file, &[1, 2, 3, 4]).unwrap();
        assert_eq!(fs::read(&file).unwrap(), vec![1, 2, 3, 4]);

        let log_path = nested.join("run.log");
        {
            let mut log = FsSink.create_log(&log_path).unwrap();
            writeln!(log, "hello").unwrap();
            log.flush().unwrap();
        }
        assert_eq!(fs::read_to_string(&log_path).unwrap(), "hello\n");
    }

    #[test]
    fn test_fs_sink_keeps_existing_log() {
        let dir = tempdir().expect("Failed to create temp dir");
        let log_path = dir.path().join("run.log");
        fs::write(&log_path, "previous run\n").unwrap();

        let err = FsSink.create_log(&log_path).err().expect("existing log was replaced");
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&log_path).unwrap(), "previous run\n");
    }

    #[test]
    fn test_fs_sink_reports_missing_parent() {
        let dir = tempdir().expect("Failed to create temp dir");
        let result = FsSink.write_text(&dir.path().join("missing/file.txt"), "x");
        assert!(result.is_err());
    }
}
