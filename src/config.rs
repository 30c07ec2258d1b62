//! Configuration management for omnidump.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats. The merged result
//! is turned into the library's immutable `DumpConfig` for a dump run.

use crate::cli::{Args, ConfigFormat, DumpArgs, LogLevel};
use clap::ValueEnum;
use omnidump::dump_config::{DumpConfig, OutputMode, SectionSelection, Target, DEFAULT_PROC_ROOT};
use omnidump::process::DEFAULT_MIN_STRING_LENGTH;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// Default configuration constants
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Defaults that a config file may provide for every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory for the file-writing output modes
    #[serde(alias = "save-dir", skip_serializing_if = "Option::is_none")]
    pub save_dir: Option<PathBuf>,

    /// Minimum printable string length
    #[serde(alias = "min-string-length")]
    pub min_string_length: Option<usize>,

    pub verbose: Option<bool>,

    /// procfs mount point
    #[serde(alias = "proc-root")]
    pub proc_root: Option<PathBuf>,

    #[serde(alias = "log-level")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_dir: None,
            min_string_length: Some(DEFAULT_MIN_STRING_LENGTH),
            verbose: Some(false),
            proc_root: Some(PathBuf::from(DEFAULT_PROC_ROOT)),
            log_level: Some(DEFAULT_LOG_LEVEL.into()),
        }
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if cfg.min_string_length == Some(0) {
        return Err("min_string_length must be greater than 0".into());
    }

    if let Some(level) = cfg.log_level.as_deref() {
        if LogLevel::from_str(level, true).is_err() {
            return Err(format!(
                "Invalid log_level '{}', expected one of off/error/warn/info/debug/trace",
                level
            )
            .into());
        }
    }

    if let Some(root) = &cfg.proc_root {
        if root.as_os_str().is_empty() {
            return Err("proc_root must not be empty".into());
        }
    }

    if let Some(dir) = &cfg.save_dir {
        if dir.is_file() {
            return Err(format!("save_dir is an existing file: {}", dir.display()).into());
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(level) = args.log_level {
        config.log_level = level
            .to_possible_value()
            .map(|v| v.get_name().to_string());
    }

    Ok(config)
}

/// Effective log level: CLI flag, then config file, then the built-in default.
pub fn effective_log_level(args: &Args, config: &Config) -> LogLevel {
    args.log_level
        .or_else(|| {
            config
                .log_level
                .as_deref()
                .and_then(|s| LogLevel::from_str(s, true).ok())
        })
        .unwrap_or(LogLevel::Warn)
}

/// Enhanced configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(format!("Config file not found: {}", p.display()).into());
            }
            p.to_path_buf()
        }
        None => {
            // Try default locations
            let defaults = [
                "/etc/omnidump/omnidump.yaml",
                "/etc/omnidump/omnidump.yml",
                "/etc/omnidump/omnidump.json",
                "./omnidump.yaml",
                "./omnidump.yml",
                "./omnidump.json",
            ];

            match defaults.iter().map(Path::new).find(|p| p.exists()) {
                Some(p) => p.to_path_buf(),
                None => return Ok(Config::default()),
            }
        }
    };

    let content = fs::read_to_string(&path)?;

    // Missing keys fall back to the defaults, not to None
    let defaults = Config::default();
    let loaded: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            config
        }
        Some("toml") => {
            let config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            config
        }
        _ => {
            // Default to YAML
            let config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            config
        }
    };

    Ok(Config {
        save_dir: loaded.save_dir.or(defaults.save_dir),
        min_string_length: loaded.min_string_length.or(defaults.min_string_length),
        verbose: loaded.verbose.or(defaults.verbose),
        proc_root: loaded.proc_root.or(defaults.proc_root),
        log_level: loaded.log_level.or(defaults.log_level),
    })
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };

    println!("{output}");
    Ok(())
}

/// Invalid combinations of `dump` flags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    #[error("Cannot provide both a PID and the --self flag.")]
    PidAndSelf,

    #[error("A PID or --self flag is required.")]
    MissingTarget,

    #[error("The '--log-unclassified' flag cannot be used with any other section flags.")]
    UnclassifiedWithSections,

    #[error("When using '--log-unclassified', the '--length' flag requires the '--verbose' flag.")]
    LengthWithoutVerbose,

    #[error("When using '{0}', the '--save-dir' flag is required.")]
    MissingSaveDir(&'static str),

    #[error("The '{0}' flag requires at least one section flag (-e, --heap, etc.) to be specified.")]
    MissingSection(&'static str),

    #[error("The '--length' flag requires the '--verbose' or the '--strings' flag.")]
    LengthWithoutOutput,

    #[error("Please provide a value greater than 0 for '--length'.")]
    InvalidLength,
}

/// Checks `dump` flags against each other and merges them over the file config.
pub fn build_dump_config(args: &DumpArgs, file: &Config) -> Result<DumpConfig, UsageError> {
    let target = match (args.pid, args.current) {
        (Some(_), true) => return Err(UsageError::PidAndSelf),
        (Some(pid), false) => Target::Pid(pid),
        (None, true) => Target::Current,
        (None, false) => return Err(UsageError::MissingTarget),
    };

    let categories = args.sections.categories();
    let any_section = args.all || !categories.is_empty();
    let save_dir = args.save_dir.clone().or_else(|| file.save_dir.clone());

    if args.log_unclassified {
        if any_section {
            return Err(UsageError::UnclassifiedWithSections);
        }
        if args.length.is_some() && !args.verbose {
            return Err(UsageError::LengthWithoutVerbose);
        }
        if save_dir.is_none() {
            return Err(UsageError::MissingSaveDir("--log-unclassified"));
        }
    }

    for (set, flag) in [(args.log_sections, "--log-sections"), (args.log_strings, "--log-strings")] {
        if !set {
            continue;
        }
        if !any_section {
            return Err(UsageError::MissingSection(flag));
        }
        if save_dir.is_none() {
            return Err(UsageError::MissingSaveDir(flag));
        }
    }

    if args.strings && !any_section {
        return Err(UsageError::MissingSection("--strings"));
    }

    let min_string_length = match args.length {
        Some(_) if !(args.verbose || args.strings || args.log_strings) => {
            return Err(UsageError::LengthWithoutOutput);
        }
        Some(n) if n <= 0 => return Err(UsageError::InvalidLength),
        Some(n) => Some(usize::try_from(n).map_err(|_| UsageError::InvalidLength)?),
        None => file.min_string_length,
    };

    Ok(DumpConfig {
        target,
        sections: SectionSelection::new(args.all, categories),
        mode: OutputMode::from_flags(args.log_unclassified, args.log_sections, args.log_strings),
        min_string_length,
        verbose: args.verbose || file.verbose.unwrap_or(false),
        strings: args.strings,
        save_dir,
        proc_root: file
            .proc_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_ROOT)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::SectionFlags;
    use omnidump::process::Category;
    use std::io::Write;
    use tempfile::tempdir;

    fn dump_args() -> DumpArgs {
        DumpArgs {
            pid: Some(42),
            ..Default::default()
        }
    }

    fn heap_only() -> SectionFlags {
        SectionFlags {
            heap: true,
            ..Default::default()
        }
    }

    // -------------------------------------------------------------------------
    // Tests for config file loading
    // -------------------------------------------------------------------------

    #[test]
    fn test_load_yaml_config_fills_defaults() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("omnidump.yaml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "save-dir: /var/tmp/dumps\nmin_string_length: 6").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.save_dir, Some(PathBuf::from("/var/tmp/dumps")));
        assert_eq!(config.min_string_length, Some(6));
        assert_eq!(config.log_level.as_deref(), Some("warn"));
        assert_eq!(config.proc_root, Some(PathBuf::from("/proc")));
    }

    #[test]
    fn test_load_json_and_toml_config() {
        let dir = tempdir().expect("Failed to create temp dir");

        let json = dir.path().join("omnidump.json");
        fs::write(&json, r#"{"verbose": true, "log_level": "debug"}"#).unwrap();
        let config = load_config(Some(&json)).unwrap();
        assert_eq!(config.verbose, Some(true));
        assert_eq!(config.log_level.as_deref(), Some("debug"));

        let toml_path = dir.path().join("omnidump.toml");
        fs::write(&toml_path, "proc_root = \"/tmp/proc\"\n").unwrap();
        let config = load_config(Some(&toml_path)).unwrap();
        assert_eq!(config.proc_root, Some(PathBuf::from("/tmp/proc")));
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let dir = tempdir().expect("Failed to create temp dir");
        assert!(load_config(Some(&dir.path().join("nope.yaml"))).is_err());
    }

    #[test]
    fn test_validate_effective_config() {
        assert!(validate_effective_config(&Config::default()).is_ok());

        let bad_length = Config {
            min_string_length: Some(0),
            ..Default::default()
        };
        assert!(validate_effective_config(&bad_length).is_err());

        let bad_level = Config {
            log_level: Some("loud".into()),
            ..Default::default()
        };
        assert!(validate_effective_config(&bad_level).is_err());
    }

    // -------------------------------------------------------------------------
    // Tests for dump flag validation
    // -------------------------------------------------------------------------

    #[test]
    fn test_target_selection() {
        let both = DumpArgs {
            current: true,
            ..dump_args()
        };
        assert_eq!(
            build_dump_config(&both, &Config::default()),
            Err(UsageError::PidAndSelf)
        );
        assert_eq!(
            build_dump_config(&DumpArgs::default(), &Config::default()),
            Err(UsageError::MissingTarget)
        );

        let current = DumpArgs {
            current: true,
            ..Default::default()
        };
        let config = build_dump_config(&current, &Config::default()).unwrap();
        assert_eq!(config.target, Target::Current);
        assert_eq!(config.mode, OutputMode::Console);
    }

    #[test]
    fn test_log_unclassified_rules() {
        let with_section = DumpArgs {
            log_unclassified: true,
            save_dir: Some("/tmp/out".into()),
            sections: heap_only(),
            ..dump_args()
        };
        assert_eq!(
            build_dump_config(&with_section, &Config::default()),
            Err(UsageError::UnclassifiedWithSections)
        );

        let length_only = DumpArgs {
            log_unclassified: true,
            save_dir: Some("/tmp/out".into()),
            length: Some(8),
            ..dump_args()
        };
        assert_eq!(
            build_dump_config(&length_only, &Config::default()),
            Err(UsageError::LengthWithoutVerbose)
        );

        let no_dir = DumpArgs {
            log_unclassified: true,
            ..dump_args()
        };
        assert_eq!(
            build_dump_config(&no_dir, &Config::default()),
            Err(UsageError::MissingSaveDir("--log-unclassified"))
        );
    }

    #[test]
    fn test_section_logging_rules() {
        let no_section = DumpArgs {
            log_sections: true,
            save_dir: Some("/tmp/out".into()),
            ..dump_args()
        };
        assert_eq!(
            build_dump_config(&no_section, &Config::default()),
            Err(UsageError::MissingSection("--log-sections"))
        );

        // A save_dir from the config file satisfies the requirement
        let file = Config {
            save_dir: Some("/srv/dumps".into()),
            ..Default::default()
        };
        let args = DumpArgs {
            log_strings: true,
            all: true,
            length: Some(6),
            ..dump_args()
        };
        let config = build_dump_config(&args, &file).unwrap();
        assert_eq!(config.mode, OutputMode::SectionStrings);
        assert_eq!(config.save_dir, Some(PathBuf::from("/srv/dumps")));
        assert_eq!(config.min_string_length, Some(6));
        assert!(config.sections.is_all());
    }

    #[test]
    fn test_length_rules() {
        let bare_length = DumpArgs {
            length: Some(5),
            sections: heap_only(),
            ..dump_args()
        };
        assert_eq!(
            build_dump_config(&bare_length, &Config::default()),
            Err(UsageError::LengthWithoutOutput)
        );

        let zero = DumpArgs {
            length: Some(0),
            verbose: true,
            ..dump_args()
        };
        assert_eq!(
            build_dump_config(&zero, &Config::default()),
            Err(UsageError::InvalidLength)
        );

        let strings_without_section = DumpArgs {
            strings: true,
            ..dump_args()
        };
        assert_eq!(
            build_dump_config(&strings_without_section, &Config::default()),
            Err(UsageError::MissingSection("--strings"))
        );
    }

    #[test]
    fn test_console_config_merges_file_defaults() {
        let file = Config {
            verbose: Some(true),
            min_string_length: Some(7),
            proc_root: Some("/tmp/fakeproc".into()),
            ..Default::default()
        };
        let args = DumpArgs {
            sections: SectionFlags {
                stack: true,
                unclassified: true,
                ..Default::default()
            },
            ..dump_args()
        };
        let config = build_dump_config(&args, &file).unwrap();
        assert!(config.verbose);
        assert_eq!(config.min_string_length, Some(7));
        assert_eq!(config.maps_path(), PathBuf::from("/tmp/fakeproc/42/maps"));
        assert_eq!(config.sections.resolve(), vec![Category::Stack, Category::None]);
    }
}
