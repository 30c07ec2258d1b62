//! Parse-and-classify pipeline over a whole maps listing.

use ahash::AHashMap as HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::DumpError;
use crate::process::classifier::{classify_region, Category};
use crate::process::maps::{parse_map_line, Region};

/// Regions of one process grouped by category, in listing order.
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    buckets: HashMap<Category, Vec<Region>>,
    rejected_lines: usize,
}

impl Default for RegionCatalog {
    fn default() -> Self {
        let buckets = Category::ALL
            .iter()
            .map(|&category| (category, Vec::new()))
            .collect();
        Self {
            buckets,
            rejected_lines: 0,
        }
    }
}

impl RegionCatalog {
    /// Parses and classifies every line; malformed lines are reported and dropped.
    pub fn build<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::default();

        for (idx, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            if line.trim().is_empty() {
                continue;
            }
            match parse_map_line(line) {
                Ok(region) => catalog.insert(region),
                Err(e) => {
                    warn!("No match for maps line {}: {} ({})", idx + 1, line.trim(), e);
                    catalog.rejected_lines += 1;
                }
            }
        }

        debug!(
            "Catalog built: {} regions, {} rejected lines",
            catalog.total_regions(),
            catalog.rejected_lines
        );
        catalog
    }

    /// Reads and catalogs a maps file such as `/proc/<pid>/maps`.
    ///
    /// Paths may hold arbitrary bytes; invalid UTF-8 is decoded lossily.
    pub fn load(path: &Path) -> Result<Self, DumpError> {
        let raw = fs::read(path).map_err(|e| DumpError::open_failure(path, e))?;
        let content = String::from_utf8_lossy(&raw);
        Ok(Self::build(content.lines()))
    }

    fn insert(&mut self, region: Region) {
        let category = classify_region(&region);
        self.buckets.entry(category).or_default().push(region);
    }

    /// Regions for a category; empty when none were classified there.
    pub fn regions(&self, category: Category) -> &[Region] {
        self.buckets
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every bucket in display order, empty ones included.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[Region])> + '_ {
        Category::ALL
            .iter()
            .map(move |&category| (category, self.regions(category)))
    }

    pub fn total_regions(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn rejected_lines(&self) -> usize {
        self.rejected_lines
    }
}
