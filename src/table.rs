//! Tabular input helpers.
//!
//! Reads CSV and Parquet tables into polars DataFrames and extracts typed
//! columns for the lookup table and field table loaders.

use crate::error::{LandUseError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supported on-disk table formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Parquet,
}

impl TableFormat {
    const ALL: [TableFormat; 2] = [TableFormat::Csv, TableFormat::Parquet];

    /// Detect the format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ALL
            .into_iter()
            .find(|format| ext.eq_ignore_ascii_case(format.extension()))
    }

    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Parquet => "parquet",
        }
    }
}

/// Read a CSV or Parquet table from disk
pub fn read_table(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(LandUseError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("table not found: {}", path.display()),
        )));
    }

    let format = TableFormat::from_path(path).ok_or_else(|| LandUseError::InvalidFormat {
        path: path.to_path_buf(),
        reason: "unsupported table extension (expected .csv or .parquet)".to_string(),
    })?;

    debug!("Reading {:?} table: {}", format, path.display());

    let df = match format {
        TableFormat::Csv => CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10_000))
            .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
            .finish()?,
        TableFormat::Parquet => ParquetReader::new(File::open(path)?).finish()?,
    };

    Ok(df)
}

/// Whether a column with this name exists
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Extract a column as nullable integers
pub fn i64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Int64)?;
    Ok(series.i64()?.into_iter().collect())
}

/// Extract a column as nullable floats
pub fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

/// Extract a column as nullable strings
pub fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}
