//! Show command implementation.
//!
//! Lists processes that expose a memory map.

use std::path::Path;

use omnidump::process::{list_processes, ProcessInfo};

/// One listing line per process.
pub fn format_process_line(info: &ProcessInfo) -> String {
    format!(
        "PID: {} - Name: {} - Status: {} - Owner: {}",
        info.pid, info.name, info.status, info.owner
    )
}

/// Lists processes under `proc_root`, optionally only those of `owner`.
pub fn command_show(owner: Option<&str>, proc_root: &Path) -> anyhow::Result<()> {
    println!("Showing processes...");

    let processes = list_processes(proc_root, owner);
    if processes.is_empty() {
        match owner {
            Some(name) => println!("No processes found for owner '{}'.", name),
            None => println!("No processes found under {}.", proc_root.display()),
        }
        return Ok(());
    }

    for info in &processes {
        println!("{}", format_process_line(info));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_process_line() {
        let info = ProcessInfo {
            pid: 812,
            name: "sshd".into(),
            status: "sleeping".into(),
            owner: "root".into(),
        };
        assert_eq!(
            format_process_line(&info),
            "PID: 812 - Name: sshd - Status: sleeping - Owner: root"
        );
    }
}
