//! Integration tests for the processor module
//!
//! Tests the complete watershed pipeline using temporary field tables.

pub mod basic_processing;
pub mod error_handling;

use std::fs;
use std::path::{Path, PathBuf};

/// Header of a seven-year field table (2014-2020)
pub(crate) const FIELD_HEADER: &str = "FBndID,Acres,maj14,pct14,maj15,pct15,maj16,pct16,maj17,pct17,maj18,pct18,maj19,pct19,maj20,pct20";

/// Write a field table for `watershed_id` under `dir`
pub(crate) fn write_field_table(dir: &Path, watershed_id: &str, rows: &[&str]) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(format!("fields_{}.csv", watershed_id));
    let mut contents = String::from(FIELD_HEADER);
    for row in rows {
        contents.push('\n');
        contents.push_str(row);
    }
    contents.push('\n');
    fs::write(&path, contents).unwrap();
    path
}
