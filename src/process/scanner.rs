//! Process discovery under a proc root for the `show` command.
//!
//! Processes may exit while the directory is being walked; entries whose
//! files disappear are skipped.

use nix::unistd::{Uid, User};
use std::fs;
use std::path::{Path, PathBuf};

/// Process entry representing a directory in /proc filesystem.
#[derive(Debug, Clone)]
pub struct ProcEntry {
    pub pid: u32,
    pub proc_path: PathBuf,
}

/// Summary row printed by `show`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub status: String,
    pub owner: String,
}

/// Fields of interest from `/proc/<pid>/status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcStatus {
    pub state: String,
    pub uid: Option<u32>,
}

/// Scans a proc root for numeric PID directories that expose a maps file.
pub fn collect_proc_entries(root: &Path, max: Option<usize>) -> Vec<ProcEntry> {
    let mut out = Vec::new();
    if let Ok(entries) = fs::read_dir(root) {
        for entry in entries.flatten() {
            let p = entry.path();
            let name = match p.file_name().and_then(|s| s.to_str()) {
                Some(v) => v,
                None => continue,
            };
            if !name.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            if !p.join("maps").exists() {
                continue;
            }
            let pid: u32 = match name.parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            out.push(ProcEntry { pid, proc_path: p });
            if let Some(maxp) = max {
                if out.len() >= maxp {
                    break;
                }
            }
        }
    }
    out.sort_by_key(|e| e.pid);
    out
}

/// Reads process name from comm file or extracts from cmdline.
pub fn read_process_name(proc_path: &Path) -> Option<String> {
    let comm = proc_path.join("comm");
    if let Ok(s) = fs::read_to_string(&comm) {
        let t = s.trim();
        if !t.is_empty() {
            return Some(t.into());
        }
    }

    let cmd = proc_path.join("cmdline");
    if let Ok(content) = fs::read(&cmd) {
        let argv0 = content
            .split(|&b| b == 0u8)
            .next()
            .and_then(|s| std::str::from_utf8(s).ok())
            .filter(|s| !s.is_empty())?;
        return Path::new(argv0)
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string());
    }
    None
}

/// Parses the `State:` and `Uid:` lines of a status file.
pub fn parse_status(content: &str) -> ProcStatus {
    let mut state = String::from("unknown");
    let mut uid = None;

    for line in content.lines() {
        if let Some(v) = line.strip_prefix("State:") {
            // "S (sleeping)" -> "sleeping"
            let v = v.trim();
            state = match (v.find('('), v.rfind(')')) {
                (Some(open), Some(close)) if open < close => v[open + 1..close].to_string(),
                _ => v.to_string(),
            };
        } else if let Some(v) = line.strip_prefix("Uid:") {
            uid = v.split_whitespace().next().and_then(|s| s.parse().ok());
        }
    }

    ProcStatus { state, uid }
}

/// Reads and parses `/proc/<pid>/status`.
pub fn read_process_status(proc_path: &Path) -> Option<ProcStatus> {
    fs::read_to_string(proc_path.join("status"))
        .ok()
        .map(|c| parse_status(&c))
}

/// Resolves a uid to a user name, falling back to the numeric id.
pub fn resolve_owner(uid: u32) -> String {
    match User::from_uid(Uid::from_raw(uid)) {
        Ok(Some(user)) => user.name,
        _ => uid.to_string(),
    }
}

/// Lists processes under `root`, optionally keeping only those owned by `owner`.
pub fn list_processes(root: &Path, owner: Option<&str>) -> Vec<ProcessInfo> {
    collect_proc_entries(root, None)
        .into_iter()
        .filter_map(|entry| {
            let name = read_process_name(&entry.proc_path)?;
            let status = read_process_status(&entry.proc_path)?;
            let owner_name = status
                .uid
                .map(resolve_owner)
                .unwrap_or_else(|| "unknown".to_string());
            Some(ProcessInfo {
                pid: entry.pid,
                name,
                status: status.state,
                owner: owner_name,
            })
        })
        .filter(|info| owner.map_or(true, |o| info.owner == o))
        .collect()
}
