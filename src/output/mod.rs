//! Output routing for dumped regions.
//!
//! This module provides:
//! - `router`: Mode selection and the top-level dump entry points
//! - `console`: Section listing on stdout
//! - `sections`: Per-region binary and strings files
//! - `unclassified`: Timestamped log of `none` regions
//! - `sink`: Filesystem abstraction used by the file-writing modes

pub mod console;
pub mod router;
pub mod sections;
pub mod sink;
pub mod unclassified;

use std::fmt;
use std::io::{Read, Seek, Write};

use tracing::warn;

use crate::error::DumpError;
use crate::process::{MemoryImage, Region, RegionChunk};

pub use router::{dump_process, dump_regions};
pub use sink::{FileSink, FsSink};

/// Per-invocation tally of region outcomes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DumpReport {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl DumpReport {
    pub fn merge(&mut self, other: DumpReport) {
        self.written += other.written;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    pub fn total(&self) -> usize {
        self.written + self.skipped + self.failed
    }
}

/// Memory handle opened on first use and closed when dropped.
pub(crate) struct LazyImage<'a, M: MemoryImage> {
    source: &'a M,
    handle: Option<M::Handle>,
}

impl<'a, M: MemoryImage> LazyImage<'a, M> {
    pub(crate) fn new(source: &'a M) -> Self {
        Self {
            source,
            handle: None,
        }
    }

    pub(crate) fn get(&mut self) -> Result<&mut M::Handle, DumpError> {
        let handle = match self.handle.take() {
            Some(handle) => handle,
            None => self.source.open()?,
        };
        Ok(self.handle.insert(handle))
    }
}

/// Reads one region, folding skips and failures into `report`.
///
/// Returns the bytes only when the region was actually read.
pub(crate) fn read_or_record<R: Read + Seek>(
    region: &Region,
    mem: &mut R,
    report: &mut DumpReport,
) -> Option<Vec<u8>> {
    match crate::process::read_region(region, mem) {
        Ok(RegionChunk::Bytes(chunk)) => Some(chunk),
        Ok(RegionChunk::Skipped(_)) => {
            report.skipped += 1;
            None
        }
        Err(e) => {
            warn!("{}", e);
            report.failed += 1;
            None
        }
    }
}

/// Writes one line of operator-facing output; failures are logged, not raised.
pub(crate) fn say<W: Write>(out: &mut W, args: fmt::Arguments<'_>) {
    if let Err(e) = writeln!(out, "{}", args) {
        warn!("Failed to write console output: {}", e);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory doubles shared by the output tests.

    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::ffi::OsStr;
    use std::io::{self, Cursor, Write};
    use std::path::{Path, PathBuf};
    use std::rc::Rc;

    use super::FileSink;
    use crate::error::DumpError;
    use crate::process::MemoryImage;

    /// Memory image where byte `i` holds `i as u8`.
    pub struct VecImage(pub Vec<u8>);

    impl VecImage {
        pub fn with_len(len: usize) -> Self {
            VecImage((0..len).map(|i| i as u8).collect())
        }
    }

    impl MemoryImage for VecImage {
        type Handle = Cursor<Vec<u8>>;

        fn open(&self) -> Result<Self::Handle, DumpError> {
            Ok(Cursor::new(self.0.clone()))
        }
    }

    /// Writer whose contents stay readable after it is boxed away.
    #[derive(Clone, Default)]
    pub struct SharedBuf(pub Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Log writer that accepts data but cannot flush it.
    struct BrokenFlush(SharedBuf);

    impl Write for BrokenFlush {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("no space left on device"))
        }
    }

    /// Sink that records writes in memory and can refuse chosen file names.
    #[derive(Default)]
    pub struct MemorySink {
        pub dirs: RefCell<Vec<PathBuf>>,
        pub files: RefCell<Vec<(PathBuf, Vec<u8>)>>,
        pub logs: RefCell<Vec<(PathBuf, SharedBuf)>>,
        pub refuse: HashSet<String>,
        pub fail_flush: bool,
    }

    impl MemorySink {
        pub fn file_names(&self) -> Vec<String> {
            self.files
                .borrow()
                .iter()
                .filter_map(|(p, _)| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .collect()
        }

        pub fn log_text(&self) -> Option<String> {
            self.logs
                .borrow()
                .first()
                .map(|(_, buf)| String::from_utf8_lossy(&buf.0.borrow()).into_owned())
        }

        pub fn contents(&self, name: &str) -> Option<Vec<u8>> {
            self.files
                .borrow()
                .iter()
                .find(|(p, _)| p.file_name() == Some(OsStr::new(name)))
                .map(|(_, data)| data.clone())
        }

        fn check(&self, path: &Path) -> io::Result<()> {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if self.refuse.contains(&name) {
                return Err(io::Error::from(io::ErrorKind::PermissionDenied));
            }
            Ok(())
        }
    }

    impl FileSink for MemorySink {
        fn create_dir_all(&self, path: &Path) -> io::Result<()> {
            self.check(path)?;
            self.dirs.borrow_mut().push(path.to_path_buf());
            Ok(())
        }

        fn write_bytes(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
            self.check(path)?;
            self.files
                .borrow_mut()
                .push((path.to_path_buf(), bytes.to_vec()));
            Ok(())
        }

        fn create_log(&self, path: &Path) -> io::Result<Box<dyn Write>> {
            self.check(path)?;
            if self.logs.borrow().iter().any(|(p, _)| p == path) {
                return Err(io::Error::from(io::ErrorKind::AlreadyExists));
            }
            let buf = SharedBuf::default();
            self.logs.borrow_mut().push((path.to_path_buf(), buf.clone()));
            if self.fail_flush {
                return Ok(Box::new(BrokenFlush(buf)));
            }
            Ok(Box::new(buf))
        }
    }
}
