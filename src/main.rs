//! omnidump - process memory region classifier and dumper
//!
//! Main entry point: resolves configuration, initializes tracing on stderr
//! and dispatches to the subcommands.

mod cli;
mod commands;
mod config;
mod startup_checks;

use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use tracing::{debug, Level};

use cli::{Args, Commands, LogLevel};
use commands::{command_check, command_config, command_dump, command_show};
use config::{effective_log_level, resolve_config, show_config, validate_effective_config, Config};
use omnidump::dump_config::DEFAULT_PROC_ROOT;

/// Initializes tracing logging subsystem with the effective log level.
fn setup_logging(level: LogLevel) {
    let log_level = match level {
        LogLevel::Off => return,
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    debug!("Logging initialized with level: {:?}", level);
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> Config {
    let config = match resolve_config(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    config
}

/// Loads the validated config and starts logging at its effective level.
fn prepare(args: &Args) -> Config {
    let config = load_validated_config(args);
    setup_logging(effective_log_level(args, &config));
    config
}

/// Main application entry point.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format);
    }

    let Some(command) = &args.command else {
        Args::command().print_help()?;
        println!();
        std::process::exit(1);
    };

    match command {
        // Config generation works without a valid config file
        Commands::Config {
            output,
            format,
            commented,
        } => command_config(output.clone(), *format, *commented)?,
        Commands::Dump(dump_args) => {
            let config = prepare(&args);
            command_dump(dump_args, &config)?
        }
        Commands::Show { owner } => {
            let config = prepare(&args);
            let proc_root = config
                .proc_root
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_ROOT));
            command_show(owner.as_deref(), &proc_root)?
        }
        Commands::Check => {
            let config = prepare(&args);
            command_check(&config)?
        }
    }

    Ok(())
}
