//! Region classification into semantic categories.
//!
//! Classification is a pure function of a region's path and permissions.
//! Rules are evaluated in a fixed order and the first match wins; several
//! predicates overlap, so the order matters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::process::maps::Region;

/// Semantic bucket a memory region belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Executable,
    SharedLibs,
    Heap,
    Stack,
    Vvar,
    Vsyscall,
    Vdso,
    Anon,
    GuardPages,
    FileBacked,
    TmpfsShm,
    DeviceMappings,
    AnonMap,
    None,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 14] = [
        Category::Executable,
        Category::SharedLibs,
        Category::Heap,
        Category::Stack,
        Category::Vvar,
        Category::Vsyscall,
        Category::Vdso,
        Category::Anon,
        Category::GuardPages,
        Category::FileBacked,
        Category::TmpfsShm,
        Category::DeviceMappings,
        Category::AnonMap,
        Category::None,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Executable => "executable",
            Category::SharedLibs => "shared_libs",
            Category::Heap => "heap",
            Category::Stack => "stack",
            Category::Vvar => "vvar",
            Category::Vsyscall => "vsyscall",
            Category::Vdso => "vdso",
            Category::Anon => "anon",
            Category::GuardPages => "guard_pages",
            Category::FileBacked => "file_backed",
            Category::TmpfsShm => "tmpfs_shm",
            Category::DeviceMappings => "device_mappings",
            Category::AnonMap => "anon_map",
            Category::None => "none",
        }
    }

    /// Upper-case name used in console section headers.
    pub fn header(self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Matches `.so` optionally followed by `.<digits>` version groups at the end of the path.
fn has_shared_lib_suffix(path: &str) -> bool {
    let mut rest = path;
    while let Some(idx) = rest.rfind('.') {
        let tail = &rest[idx + 1..];
        if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
            break;
        }
        rest = &rest[..idx];
    }
    rest.ends_with(".so")
}

/// Last path segment made only of `[A-Za-z0-9_-]`, i.e. a bare executable name.
fn has_bare_name(path: &str) -> bool {
    path.rsplit_once('/').is_some_and(|(_, name)| {
        !name.is_empty()
            && name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    })
}

fn classify_path(path: &str) -> Category {
    if has_shared_lib_suffix(path) {
        return Category::SharedLibs;
    }
    if has_bare_name(path) || path.contains("firefox") {
        if path.contains(".so") {
            return Category::SharedLibs;
        }
        return Category::Executable;
    }
    Category::FileBacked
}

/// Assigns a region to exactly one [`Category`].
pub fn classify_region(region: &Region) -> Category {
    classify(&region.path, &region.permissions)
}

/// Classification over the raw path and permission strings.
pub fn classify(path: &str, permissions: &str) -> Category {
    let blank = path.trim().is_empty();

    if path.contains("[heap]") {
        Category::Heap
    } else if path.contains("[stack]") {
        Category::Stack
    } else if path.contains("[vvar]") {
        Category::Vvar
    } else if path.contains("[vsyscall]") {
        Category::Vsyscall
    } else if path.contains("[vdso]") {
        Category::Vdso
    } else if path.starts_with("[anon") {
        Category::Anon
    } else if blank && permissions.starts_with("---") {
        Category::GuardPages
    } else if path.starts_with("/dev/shm") || path.contains("tmpfs") {
        Category::TmpfsShm
    } else if path.starts_with("/dev/") {
        Category::DeviceMappings
    } else if blank {
        Category::AnonMap
    } else if path.contains('/') {
        classify_path(path)
    } else {
        Category::None
    }
}
