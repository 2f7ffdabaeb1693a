//! Error handling for land-use classification.
//!
//! Provides error types with context for lookup-table resolution,
//! classification window checks, field table parsing and output writing.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LandUseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Config file parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown land-cover code: {code}")]
    UnknownCode { code: String },

    #[error("Invalid observation window for field {field_id}: expected {expected} years, found {found}")]
    InvalidWindow {
        field_id: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid lookup table {path}: {reason}")]
    LookupTable { path: PathBuf, reason: String },

    #[error("Invalid field table format in file: {path} - {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("Watershed input not found at path: {path}")]
    WatershedNotFound { path: PathBuf },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Processing failed for: {path} - {reason}")]
    ProcessingFailed { path: PathBuf, reason: String },
}

impl LandUseError {
    /// Create an unknown code error from anything displayable
    pub fn unknown_code(code: impl ToString) -> Self {
        Self::UnknownCode {
            code: code.to_string(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LandUseError>;
