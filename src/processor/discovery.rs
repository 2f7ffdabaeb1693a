//! Watershed table discovery
//!
//! Finds per-watershed field tables under the input directory and derives
//! each watershed's identifier from its file name.

use crate::constants::output_tables;
use crate::error::{LandUseError, Result};
use crate::table::TableFormat;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::debug;
use walkdir::WalkDir;

/// Digit run naming a hydrologic unit (HUC8 through HUC12)
const WATERSHED_ID_PATTERN: &str = r"(\d{8,12})";

/// One discovered watershed field table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatershedTable {
    pub watershed_id: String,
    pub path: PathBuf,
}

/// File discovery component for watershed field tables
#[derive(Debug, Clone)]
pub struct WatershedDiscovery {
    input_path: PathBuf,
    pattern: glob::Pattern,
    id_regex: Regex,
    excluded: HashSet<PathBuf>,
}

impl WatershedDiscovery {
    /// Create a discovery over `input_path`, matching file names against `pattern`
    pub fn new(input_path: PathBuf, pattern: &str) -> Result<Self> {
        let pattern = glob::Pattern::new(pattern).map_err(|e| {
            LandUseError::configuration(format!("invalid file pattern '{}': {}", pattern, e))
        })?;
        let id_regex = Regex::new(WATERSHED_ID_PATTERN)
            .map_err(|e| LandUseError::configuration(e.to_string()))?;

        Ok(Self {
            input_path,
            pattern,
            id_regex,
            excluded: HashSet::new(),
        })
    }

    /// Skip a specific file (e.g. a lookup table stored beside the inputs)
    pub fn with_excluded(mut self, path: &Path) -> Self {
        self.excluded.insert(normalize(path));
        self
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// Discover every watershed table, sorted by watershed id
    ///
    /// Accepts either a directory (searched recursively) or a single table.
    pub async fn discover_tables(&self) -> Result<Vec<WatershedTable>> {
        let discovery = self.clone();
        task::spawn_blocking(move || discovery.scan())
            .await
            .map_err(|e| LandUseError::ProcessingFailed {
                path: self.input_path.clone(),
                reason: format!("discovery task failed: {}", e),
            })?
    }

    fn scan(&self) -> Result<Vec<WatershedTable>> {
        if !self.input_path.exists() {
            return Err(LandUseError::WatershedNotFound {
                path: self.input_path.clone(),
            });
        }

        debug!("Searching for watershed tables in: {}", self.input_path.display());

        let mut tables = Vec::new();
        for entry in WalkDir::new(&self.input_path).follow_links(true) {
            let entry = entry.map_err(|e| LandUseError::ProcessingFailed {
                path: self.input_path.clone(),
                reason: e.to_string(),
            })?;
            let path = entry.path();

            if !entry.file_type().is_file() || !self.accepts(path) {
                continue;
            }

            tables.push(WatershedTable {
                watershed_id: self.watershed_id(path),
                path: path.to_path_buf(),
            });
        }

        tables.sort_by(|a, b| a.watershed_id.cmp(&b.watershed_id).then(a.path.cmp(&b.path)));
        debug!("Found {} watershed tables", tables.len());
        Ok(tables)
    }

    fn accepts(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };

        is_table_file(path)
            && !is_output_table(name)
            && self.pattern.matches(name)
            && !self.excluded.contains(&normalize(path))
    }

    /// Watershed id from the file name, falling back to the file stem
    pub fn watershed_id(&self, path: &Path) -> String {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown");

        self.id_regex
            .captures(stem)
            .and_then(|c| c.get(1))
            .map_or_else(|| stem.to_string(), |m| m.as_str().to_string())
    }
}

/// Check if a path is a table the reader can open
fn is_table_file(path: &Path) -> bool {
    TableFormat::from_path(path).is_some()
}

/// Tables written by this tool are never inputs
fn is_output_table(name: &str) -> bool {
    [
        output_tables::LAND_USE,
        output_tables::CROP_HISTORY,
        output_tables::FIELD_BOUNDARY,
    ]
    .iter()
    .any(|prefix| name.starts_with(&format!("{}_", prefix)))
        || name.starts_with("run_summary")
}

fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
