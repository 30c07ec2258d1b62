//! Dump command implementation.
//!
//! Validates the flag combination, checks runtime requirements and routes the
//! classified regions of one process to the selected output.

use std::io::{self, Write};

use anyhow::Context;
use tracing::{debug, error, warn};

use omnidump::error::DumpError;
use omnidump::output::dump_process;

use crate::cli::DumpArgs;
use crate::config::{build_dump_config, Config};
use crate::startup_checks::validate_requirements;

/// Flushes console output before an abort; a failure is only logged.
fn flush_before_exit<W: Write>(out: &mut W) -> bool {
    match out.flush() {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to flush console output: {}", e);
            false
        }
    }
}

/// Operator hint for a fatal dump error.
fn hint_for(err: &DumpError) -> Option<&'static str> {
    match err {
        DumpError::SourceNotFound { .. } => {
            Some("Run 'omnidump show' to look for another process.")
        }
        DumpError::PermissionDenied { .. } => {
            Some("Re-run as root, or grant CAP_SYS_PTRACE to the binary.")
        }
        _ => None,
    }
}

/// Dumps the memory regions of one process.
pub fn command_dump(args: &DumpArgs, file: &Config) -> anyhow::Result<()> {
    let config = match build_dump_config(args, file) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Error: {} Please run 'omnidump dump --help' for more information.",
                e
            );
            std::process::exit(1);
        }
    };
    debug!("Effective dump configuration: {:?}", config);

    if let Err(e) = validate_requirements(config.target, &config.proc_root) {
        eprintln!("❌ Requirements check failed: {}", e);
        std::process::exit(1);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Dumping memory segments for PID {}...\n", config.target.pid())
        .context("Failed to write to stdout")?;

    match dump_process(&config, &mut out) {
        Ok(report) => {
            debug!(
                "{} regions written, {} skipped, {} failed",
                report.written, report.skipped, report.failed
            );
            out.flush().context("Failed to flush stdout")?;
            Ok(())
        }
        Err(e) if e.is_fatal() => {
            flush_before_exit(&mut out);
            error!("Dump aborted: {}", e);
            eprintln!("❌ {}", e);
            if let Some(hint) = hint_for(&e) {
                eprintln!("   {}", hint);
            }
            std::process::exit(1);
        }
        Err(e) => Err(e).context("Dump failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_hints_for_fatal_errors() {
        let missing = DumpError::SourceNotFound {
            path: PathBuf::from("/proc/1/maps"),
        };
        assert!(hint_for(&missing).unwrap().contains("omnidump show"));

        let denied = DumpError::PermissionDenied {
            path: PathBuf::from("/proc/1/mem"),
        };
        assert!(hint_for(&denied).is_some());
        assert!(hint_for(&DumpError::InvalidConfig("x".into())).is_none());
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn test_flush_before_exit_reports_failure() {
        assert!(flush_before_exit(&mut Vec::new()));
        assert!(!flush_before_exit(&mut ClosedPipe));
    }
}
