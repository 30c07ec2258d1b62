//! Region reads from a process memory image (`/proc/<pid>/mem`).
//!
//! The image is opened once per output mode and each region is read with a
//! seek to its start followed by an exact read of its size.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::DumpError;
use crate::process::maps::Region;

/// Why a region was left out without being treated as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Unreadable,
    Empty,
}

/// Result of reading one region.
#[derive(Debug)]
pub enum RegionChunk {
    Skipped(SkipReason),
    Bytes(Vec<u8>),
}

/// A source that can hand out seekable handles onto a memory image.
pub trait MemoryImage {
    type Handle: Read + Seek;

    fn open(&self) -> Result<Self::Handle, DumpError>;
}

/// Memory image backed by a `/proc/<pid>/mem` file.
#[derive(Debug, Clone)]
pub struct ProcMemory {
    path: PathBuf,
}

impl ProcMemory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MemoryImage for ProcMemory {
    type Handle = File;

    fn open(&self) -> Result<File, DumpError> {
        File::open(&self.path).map_err(|e| DumpError::open_failure(&self.path, e))
    }
}

/// Reads the bytes of `region` from an open memory handle.
///
/// Regions without read permission or with a non-positive size are skipped
/// without touching the handle.
pub fn read_region<R: Read + Seek>(region: &Region, mem: &mut R) -> Result<RegionChunk, DumpError> {
    if !region.is_readable() {
        debug!("Skipping unreadable region {} ({})", region.range, region.permissions);
        return Ok(RegionChunk::Skipped(SkipReason::Unreadable));
    }
    if region.range.is_empty() {
        debug!("Skipping empty region {}", region.range);
        return Ok(RegionChunk::Skipped(SkipReason::Empty));
    }

    let failure = |source| DumpError::Read {
        range: region.range,
        source,
    };

    let size = usize::try_from(region.size()).map_err(|_| {
        failure(std::io::Error::other("region larger than addressable memory"))
    })?;

    mem.seek(SeekFrom::Start(region.range.start))
        .map_err(failure)?;

    let mut chunk = vec![0u8; size];
    mem.read_exact(&mut chunk).map_err(failure)?;

    Ok(RegionChunk::Bytes(chunk))
}
