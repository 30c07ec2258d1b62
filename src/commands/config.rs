//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::Config;

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = match output {
        Some(path) => path,
        None => PathBuf::from(match format {
            ConfigFormat::Json => "omnidump.json",
            ConfigFormat::Toml => "omnidump.toml",
            ConfigFormat::Yaml => "omnidump.yaml",
        }),
    };

    let content = render_config(&config, format, commented)?;

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Serializes `config`; YAML output may carry an explanatory header.
pub fn render_config(
    config: &Config,
    format: ConfigFormat,
    commented: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => {
            let content = serde_yaml::to_string(config)?;
            if commented {
                add_config_comments(content)
            } else {
                content
            }
        }
    })
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# omnidump Configuration
# ======================
#
# Values here are defaults; command-line flags always win.
#
# Output
# ------
# save_dir: null               # Directory for --log-sections/--log-strings/--log-unclassified
# min_string_length: 4         # Minimum printable run length for string extraction
# verbose: false               # Show permissions, inode, device and strings on the console
#
# Sources
# -------
# proc_root: "/proc"           # procfs mount point
#
# Logging
# -------
# log_level: "warn"            # off, error, warn, info, debug, trace (written to stderr)
"#;

    format!("{comments}\n{yaml}")
}
