//! Immutable dump settings shared by every core operation.
//!
//! A `DumpConfig` is produced once by the command-line layer (CLI flags merged
//! over the optional config file) and then only ever borrowed.

use std::path::{Path, PathBuf};

use crate::error::DumpError;
use crate::process::Category;

/// Default procfs mount point.
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Which process to inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Pid(u32),
    /// The running omnidump process itself.
    Current,
}

impl Target {
    pub fn pid(self) -> u32 {
        match self {
            Target::Pid(pid) => pid,
            Target::Current => std::process::id(),
        }
    }

    pub fn is_current(self) -> bool {
        self == Target::Current || self.pid() == std::process::id()
    }
}

/// Where dump output goes. Exactly one mode is active per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Console,
    /// All `none` regions into one timestamped log file.
    UnclassifiedLog,
    /// One `.bin` file per region under `<save_dir>/<category>/`.
    SectionBinary,
    /// One `-strings.txt` file per region under `<save_dir>/<category>/`.
    SectionStrings,
}

impl OutputMode {
    /// Picks the mode from the individual flags; the first enabled one wins.
    pub fn from_flags(log_unclassified: bool, log_sections: bool, log_strings: bool) -> Self {
        if log_unclassified {
            OutputMode::UnclassifiedLog
        } else if log_sections {
            OutputMode::SectionBinary
        } else if log_strings {
            OutputMode::SectionStrings
        } else {
            OutputMode::Console
        }
    }

    pub fn writes_files(self) -> bool {
        self != OutputMode::Console
    }

    /// Modes after which the unclassified-region hint is printed.
    pub fn shows_unclassified_hint(self) -> bool {
        matches!(self, OutputMode::Console | OutputMode::SectionStrings)
    }
}

/// Category selectors plus the "all" shorthand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionSelection {
    all: bool,
    categories: Vec<Category>,
}

impl SectionSelection {
    pub fn new(all: bool, categories: impl IntoIterator<Item = Category>) -> Self {
        let mut categories: Vec<Category> = categories.into_iter().collect();
        categories.sort();
        categories.dedup();
        Self { all, categories }
    }

    pub fn all() -> Self {
        Self::new(true, [])
    }

    pub fn only(categories: impl IntoIterator<Item = Category>) -> Self {
        Self::new(false, categories)
    }

    pub fn is_all(&self) -> bool {
        self.all
    }

    pub fn is_empty(&self) -> bool {
        !self.all && self.categories.is_empty()
    }

    /// Selected categories in display order. "all" covers everything but `none`.
    pub fn resolve(&self) -> Vec<Category> {
        Category::ALL
            .iter()
            .copied()
            .filter(|c| {
                if self.all {
                    *c != Category::None || self.categories.contains(c)
                } else {
                    self.categories.contains(c)
                }
            })
            .collect()
    }
}

/// Validated operator choices for one dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpConfig {
    pub target: Target,
    pub sections: SectionSelection,
    pub mode: OutputMode,
    /// Minimum printable run length; `None` or zero means the default of 4.
    pub min_string_length: Option<usize>,
    pub verbose: bool,
    /// Show extracted strings on the console without the other verbose fields.
    pub strings: bool,
    pub save_dir: Option<PathBuf>,
    pub proc_root: PathBuf,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            target: Target::Current,
            sections: SectionSelection::default(),
            mode: OutputMode::Console,
            min_string_length: None,
            verbose: false,
            strings: false,
            save_dir: None,
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
        }
    }
}

impl DumpConfig {
    pub fn proc_dir(&self) -> PathBuf {
        self.proc_root.join(self.target.pid().to_string())
    }

    pub fn maps_path(&self) -> PathBuf {
        self.proc_dir().join("maps")
    }

    pub fn mem_path(&self) -> PathBuf {
        self.proc_dir().join("mem")
    }

    /// Destination directory for the file-writing modes.
    pub fn destination(&self) -> Result<&Path, DumpError> {
        self.save_dir.as_deref().ok_or_else(|| {
            DumpError::InvalidConfig("a save directory is required for file output".into())
        })
    }

    /// Checks the invariants the output router relies on.
    pub fn validate(&self) -> Result<(), DumpError> {
        if self.mode.writes_files() {
            self.destination()?;
        }
        if matches!(
            self.mode,
            OutputMode::SectionBinary | OutputMode::SectionStrings
        ) && self.sections.is_empty()
        {
            return Err(DumpError::InvalidConfig(
                "section output requires at least one selected category".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_mode_priority() {
        assert_eq!(OutputMode::from_flags(true, true, true), OutputMode::UnclassifiedLog);
        assert_eq!(OutputMode::from_flags(false, true, true), OutputMode::SectionBinary);
        assert_eq!(OutputMode::from_flags(false, false, true), OutputMode::SectionStrings);
        assert_eq!(OutputMode::from_flags(false, false, false), OutputMode::Console);
    }

    #[test]
    fn test_selection_all_excludes_none() {
        let categories = SectionSelection::all().resolve();
        assert_eq!(categories.len(), 13);
        assert!(!categories.contains(&Category::None));

        let with_none = SectionSelection::new(true, [Category::None]).resolve();
        assert_eq!(with_none.len(), 14);
    }

    #[test]
    fn test_selection_keeps_display_order() {
        let selection = SectionSelection::only([Category::Stack, Category::Heap, Category::Stack]);
        assert_eq!(selection.resolve(), vec![Category::Heap, Category::Stack]);
        assert!(SectionSelection::default().is_empty());
    }

    #[test]
    fn test_paths_follow_proc_root() {
        let config = DumpConfig {
            target: Target::Pid(4242),
            proc_root: PathBuf::from("/tmp/fakeproc"),
            ..Default::default()
        };
        assert_eq!(config.maps_path(), PathBuf::from("/tmp/fakeproc/4242/maps"));
        assert_eq!(config.mem_path(), PathBuf::from("/tmp/fakeproc/4242/mem"));
    }

    #[test]
    fn test_validate_file_modes() {
        let mut config = DumpConfig {
            mode: OutputMode::SectionBinary,
            sections: SectionSelection::only([Category::Heap]),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.save_dir = Some(PathBuf::from("/tmp/out"));
        assert!(config.validate().is_ok());

        config.sections = SectionSelection::default();
        assert!(config.validate().is_err());

        let console = DumpConfig::default();
        assert!(console.validate().is_ok());
        assert_eq!(console.min_string_length, None);
    }
}
