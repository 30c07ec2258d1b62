//! Check command implementation.
//!
//! Validates system requirements and configuration.

use std::path::{Path, PathBuf};

use omnidump::dump_config::DEFAULT_PROC_ROOT;
use omnidump::output::DumpReport;
use omnidump::process::{
    collect_proc_entries, read_region, MemoryImage, ProcMemory, RegionCatalog, RegionChunk,
};

use crate::config::{validate_effective_config, Config};
use crate::startup_checks::is_root;

/// Reads the first readable region of a catalog through `memory`.
fn probe_memory<M: MemoryImage>(catalog: &RegionCatalog, memory: &M) -> Result<DumpReport, String> {
    let mut mem = memory.open().map_err(|e| e.to_string())?;
    let mut report = DumpReport::default();
    for (_, regions) in catalog.iter() {
        for region in regions {
            match read_region(region, &mut mem) {
                Ok(RegionChunk::Bytes(_)) => {
                    report.written += 1;
                    return Ok(report);
                }
                Ok(RegionChunk::Skipped(_)) => report.skipped += 1,
                Err(_) => report.failed += 1,
            }
        }
    }
    Err(format!(
        "no region could be read ({} skipped, {} failed)",
        report.skipped, report.failed
    ))
}

/// Validates system requirements and configuration.
pub fn command_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 omnidump - System Check");
    println!("==========================");

    let mut all_ok = true;
    let proc_root = config
        .proc_root
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_ROOT));

    // Check /proc filesystem
    println!("\n📁 Checking {} filesystem...", proc_root.display());
    if proc_root.exists() {
        println!("   ✅ {} accessible", proc_root.display());

        let proc_entries = collect_proc_entries(&proc_root, Some(5));
        if proc_entries.is_empty() {
            println!("   ❌ Cannot read any process entries from {}", proc_root.display());
            all_ok = false;
        } else {
            println!("   ✅ Can read {} process entries", proc_entries.len());
        }
    } else {
        println!("   ❌ {} not found", proc_root.display());
        all_ok = false;
    }

    // Privileges
    println!("\n🔑 Checking privileges...");
    if is_root() {
        println!("   ✅ Running as root - all processes can be dumped");
    } else {
        println!("   ⚠️  Not running as root - only own processes can be dumped");
    }

    // Own maps and memory
    println!("\n💾 Checking memory map accessibility...");
    let own = proc_root.join(std::process::id().to_string());
    match RegionCatalog::load(&own.join("maps")) {
        Ok(catalog) => {
            println!(
                "   ✅ maps readable: {} regions ({} lines rejected)",
                catalog.total_regions(),
                catalog.rejected_lines()
            );
            match probe_memory(&catalog, &ProcMemory::new(own.join("mem"))) {
                Ok(_) => println!("   ✅ mem readable"),
                Err(e) => {
                    println!("   ❌ mem not readable: {}", e);
                    all_ok = false;
                }
            }
        }
        Err(e) => {
            println!("   ❌ maps not readable: {}", e);
            all_ok = false;
        }
    }

    // Check configuration
    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => {
            println!("   ✅ Configuration is valid");
        }
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }
    if let Some(dir) = config.save_dir.as_deref() {
        report_save_dir(dir);
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - system is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}

fn report_save_dir(dir: &Path) {
    if dir.is_dir() {
        println!("   ✅ save_dir exists: {}", dir.display());
    } else {
        println!("   ℹ️  save_dir will be created on first dump: {}", dir.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omnidump::error::DumpError;
    use std::io::Cursor;

    struct Bytes(Vec<u8>);

    impl MemoryImage for Bytes {
        type Handle = Cursor<Vec<u8>>;

        fn open(&self) -> Result<Self::Handle, DumpError> {
            Ok(Cursor::new(self.0.clone()))
        }
    }

    #[test]
    fn test_probe_memory_stops_at_first_readable_region() {
        let catalog = RegionCatalog::build([
            "00000000-00000010 ---p 00000000 00:00 0",
            "00000010-00000020 r--p 00000000 00:00 0    [heap]",
        ]);
        let report = probe_memory(&catalog, &Bytes(vec![0; 0x20])).unwrap();
        assert_eq!(report.written, 1);
    }

    #[test]
    fn test_probe_memory_reports_when_nothing_is_readable() {
        let catalog = RegionCatalog::build(["00001000-00002000 r--p 00000000 00:00 0    [heap]"]);
        let err = probe_memory(&catalog, &Bytes(vec![0; 0x10])).unwrap_err();
        assert!(err.contains("1 failed"));
    }
}
