//! Runtime requirement validation before a dump.
//!
//! Reading another process's memory needs ptrace access to it. These checks
//! warn early about setups where the dump will most likely be refused.

use nix::unistd::geteuid;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};

use omnidump::dump_config::Target;

const PTRACE_SCOPE_PATH: &str = "/proc/sys/kernel/yama/ptrace_scope";

/// Validate all runtime requirements for dumping `target`
pub fn validate_requirements(target: Target, proc_root: &Path) -> Result<(), ValidationError> {
    debug!("Validating runtime requirements...");

    check_proc_access(proc_root)?;
    check_user_privileges(target);
    check_ptrace_scope(target);

    debug!("Runtime requirements validated");
    Ok(())
}

/// True when running with effective uid 0
pub fn is_root() -> bool {
    geteuid().is_root()
}

/// Warn when a foreign process is targeted without root
fn check_user_privileges(target: Target) {
    if is_root() {
        debug!("Running as root (uid=0)");
        return;
    }
    if target.is_current() {
        debug!("Not running as root, but dumping own process");
        return;
    }
    warn!("⚠️  Not running as root - reading /proc/{}/mem will likely be denied", target.pid());
    warn!("   Recommendation: run with sudo or grant CAP_SYS_PTRACE");
}

/// Check that the proc root is mounted and listable
fn check_proc_access(proc_root: &Path) -> Result<(), ValidationError> {
    match fs::read_dir(proc_root) {
        Ok(_) => {
            debug!("{} is accessible", proc_root.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            error!("❌ {} not found - is procfs mounted?", proc_root.display());
            Err(ValidationError::ProcNotMounted(proc_root.display().to_string()))
        }
        Err(e) => {
            error!("❌ Cannot read {}: {}", proc_root.display(), e);
            Err(ValidationError::InsufficientPermissions(e.to_string()))
        }
    }
}

/// Parses the Yama ptrace scope value, if present.
pub fn parse_ptrace_scope(content: &str) -> Option<u8> {
    content.trim().parse().ok()
}

/// Yama scope 1 and up blocks non-descendant reads for unprivileged users
fn check_ptrace_scope(target: Target) {
    let Some(scope) = fs::read_to_string(PTRACE_SCOPE_PATH)
        .ok()
        .and_then(|s| parse_ptrace_scope(&s))
    else {
        return;
    };

    if scope == 0 || target.is_current() {
        return;
    }
    if scope >= 3 {
        warn!("⚠️  ptrace_scope={} - memory of other processes cannot be read at all", scope);
    } else if !is_root() {
        warn!("⚠️  ptrace_scope={} - only root may read memory of pid {}", scope, target.pid());
    } else {
        info!("ptrace_scope={} - running as root", scope);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Insufficient permissions: {0}")]
    InsufficientPermissions(String),

    #[error("proc filesystem not found at {0}")]
    ProcNotMounted(String),
}
