//! Parser for `/proc/<pid>/maps` records.
//!
//! Each line has the fixed layout
//!
//! ```text
//! address           perms offset  dev   inode   pathname
//! 00400000-00452000 r-xp 00000000 08:02 173521  /usr/bin/ls
//! ```
//!
//! The pathname is everything after the inode field and may contain spaces.

use std::fmt;

use crate::error::MapParseError;

/// Maximum number of hex digits in one half of the address field.
const MAX_ADDRESS_DIGITS: usize = 16;

/// Half-open virtual address range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressRange {
    pub start: u64,
    pub end: u64,
}

impl AddressRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of bytes covered; zero for degenerate or inverted ranges.
    pub fn size(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Base name used for per-region output files, e.g. `region-0x1000-0x2000`.
    pub fn file_stem(&self) -> String {
        format!("region-{:#x}-{:#x}", self.start, self.end)
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}-{:#x}", self.start, self.end)
    }
}

/// One row of a process memory map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub range: AddressRange,
    /// Four characters over `{r,-}{w,-}{x,-}{p,s}`.
    pub permissions: String,
    pub offset: String,
    /// `major:minor` as printed by the kernel.
    pub device: String,
    pub inode: String,
    pub path: String,
}

impl Region {
    pub fn is_readable(&self) -> bool {
        self.permissions.contains('r')
    }

    pub fn size(&self) -> u64 {
        self.range.size()
    }
}

/// Whitespace field cursor over a single line.
struct Fields<'a> {
    rest: &'a str,
}

impl<'a> Fields<'a> {
    fn new(line: &'a str) -> Self {
        Self { rest: line }
    }

    fn next_field(&mut self, name: &'static str) -> Result<&'a str, MapParseError> {
        let trimmed = self.rest.trim_start();
        if trimmed.is_empty() {
            return Err(MapParseError::MissingField(name));
        }
        let end = trimmed
            .find(char::is_whitespace)
            .unwrap_or(trimmed.len());
        let (field, rest) = trimmed.split_at(end);
        self.rest = rest;
        Ok(field)
    }

    /// Everything left after the fixed fields, without surrounding line noise.
    fn remainder(self) -> &'a str {
        self.rest
            .trim_start()
            .trim_end_matches(['\n', '\r'])
    }
}

fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn parse_address(field: &str) -> Result<u64, MapParseError> {
    if !is_hex(field) || field.len() > MAX_ADDRESS_DIGITS {
        return Err(MapParseError::InvalidAddress(field.to_string()));
    }
    u64::from_str_radix(field, 16).map_err(|_| MapParseError::InvalidAddress(field.to_string()))
}

fn parse_range(field: &str) -> Result<AddressRange, MapParseError> {
    let (start, end) = field
        .split_once('-')
        .ok_or_else(|| MapParseError::InvalidAddress(field.to_string()))?;
    let start =
        parse_address(start).map_err(|_| MapParseError::InvalidAddress(field.to_string()))?;
    let end = parse_address(end).map_err(|_| MapParseError::InvalidAddress(field.to_string()))?;
    Ok(AddressRange::new(start, end))
}

fn valid_permissions(field: &str) -> bool {
    let b = field.as_bytes();
    b.len() == 4
        && matches!(b[0], b'r' | b'-')
        && matches!(b[1], b'w' | b'-')
        && matches!(b[2], b'x' | b'-')
        && matches!(b[3], b'p' | b's')
}

fn valid_device(field: &str) -> bool {
    field
        .split_once(':')
        .is_some_and(|(major, minor)| is_hex(major) && is_hex(minor))
}

/// Parses one maps line into a [`Region`].
pub fn parse_map_line(line: &str) -> Result<Region, MapParseError> {
    let mut fields = Fields::new(line);

    let range = parse_range(fields.next_field("address")?)?;

    let permissions = fields.next_field("permissions")?;
    if !valid_permissions(permissions) {
        return Err(MapParseError::InvalidPermissions(permissions.to_string()));
    }

    let offset = fields.next_field("offset")?;
    if !is_hex(offset) {
        return Err(MapParseError::InvalidOffset(offset.to_string()));
    }

    let device = fields.next_field("device")?;
    if !valid_device(device) {
        return Err(MapParseError::InvalidDevice(device.to_string()));
    }

    let inode = fields.next_field("inode")?;
    if !inode.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MapParseError::InvalidInode(inode.to_string()));
    }

    Ok(Region {
        range,
        permissions: permissions.to_string(),
        offset: offset.to_string(),
        device: device.to_string(),
        inode: inode.to_string(),
        path: fields.remainder().to_string(),
    })
}
