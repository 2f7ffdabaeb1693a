//! Configuration management and validation.
//!
//! Provides the classifier thresholds and batch processing settings.
//! Values are layered: built-in defaults, then a TOML file, then
//! `LANDUSE_*` environment variables, then command-line overrides.

use crate::constants::{
    APP_DIR_NAME, DEFAULT_FILE_PATTERN, DEFAULT_LOW_AREA_THRESHOLD,
    DEFAULT_LOW_COVERAGE_THRESHOLD, env_vars,
};
use crate::error::{LandUseError, Result};
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Output table format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

/// Supported compression algorithms for parquet output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    #[default]
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

/// Thresholds used by the rotation classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Fields at or below this area (acres) get the below-threshold label
    pub low_area_threshold: f64,

    /// Coverage percent below which a year counts as low coverage
    pub low_coverage_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            low_area_threshold: DEFAULT_LOW_AREA_THRESHOLD,
            low_coverage_threshold: DEFAULT_LOW_COVERAGE_THRESHOLD,
        }
    }
}

impl ClassifierConfig {
    pub fn with_low_area_threshold(mut self, acres: f64) -> Self {
        self.low_area_threshold = acres;
        self
    }

    pub fn with_low_coverage_threshold(mut self, percent: f64) -> Self {
        self.low_coverage_threshold = percent;
        self
    }

    /// Label pair value for fields stopped by the area gate, e.g. `LT 5 ac`
    pub fn below_threshold_label(&self) -> String {
        format!("LT {} ac", self.low_area_threshold)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.low_area_threshold.is_finite() || self.low_area_threshold < 0.0 {
            return Err(LandUseError::configuration(format!(
                "low_area_threshold must be a non-negative number, got {}",
                self.low_area_threshold
            )));
        }
        if !self.low_coverage_threshold.is_finite()
            || !(0.0..=100.0).contains(&self.low_coverage_threshold)
        {
            return Err(LandUseError::configuration(format!(
                "low_coverage_threshold must be between 0 and 100, got {}",
                self.low_coverage_threshold
            )));
        }
        Ok(())
    }
}

/// Batch processing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Reference table of land-cover codes (built-in table when unset)
    pub lookup_table: Option<PathBuf>,

    /// Number of watersheds processed concurrently
    pub workers: usize,

    pub output_format: OutputFormat,

    /// Parquet compression (ignored for CSV output)
    pub compression: CompressionAlgorithm,

    /// Overwrite existing output tables
    pub force_overwrite: bool,

    /// Glob matched against watershed table file names
    pub file_pattern: String,

    /// Write `run_summary.json` next to the outputs
    pub write_summary: bool,

    /// List discovered watersheds without classifying them
    pub dry_run: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            lookup_table: None,
            workers: num_cpus::get(),
            output_format: OutputFormat::Csv,
            compression: CompressionAlgorithm::Snappy,
            force_overwrite: false,
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            write_summary: true,
            dry_run: false,
        }
    }
}

/// Global configuration for land-use processing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandUseConfig {
    pub classifier: ClassifierConfig,
    pub processing: ProcessingConfig,
}

impl LandUseConfig {
    /// Default config file location: `<config_dir>/landuse-classifier/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("config.toml"))
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Defaults, then the config file, then environment variables
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn load_layered(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `LANDUSE_*` overrides from a variable lookup
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = var(env_vars::LOW_AREA_THRESHOLD) {
            self.classifier.low_area_threshold = parse_env(env_vars::LOW_AREA_THRESHOLD, &value)?;
        }
        if let Some(value) = var(env_vars::LOW_COVERAGE_THRESHOLD) {
            self.classifier.low_coverage_threshold =
                parse_env(env_vars::LOW_COVERAGE_THRESHOLD, &value)?;
        }
        if let Some(value) = var(env_vars::WORKERS) {
            self.processing.workers = parse_env(env_vars::WORKERS, &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.classifier.validate()?;

        if self.processing.workers == 0 {
            return Err(LandUseError::configuration("workers must be at least 1"));
        }
        if let Err(e) = glob::Pattern::new(&self.processing.file_pattern) {
            return Err(LandUseError::configuration(format!(
                "invalid file pattern '{}': {}",
                self.processing.file_pattern, e
            )));
        }
        Ok(())
    }

    /// Create configuration with custom worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.processing.workers = workers;
        self
    }

    pub fn with_lookup_table(mut self, path: PathBuf) -> Self {
        self.processing.lookup_table = Some(path);
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.processing.output_format = format;
        self
    }

    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.processing.compression = compression;
        self
    }

    /// Enable overwriting existing outputs
    pub fn with_force_overwrite(mut self) -> Self {
        self.processing.force_overwrite = true;
        self
    }

    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.processing.file_pattern = pattern.into();
        self
    }

    /// Enable dry-run mode
    pub fn with_dry_run(mut self) -> Self {
        self.processing.dry_run = true;
        self
    }

    pub fn without_summary(mut self) -> Self {
        self.processing.write_summary = false;
        self
    }

    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        LandUseError::configuration(format!("{} has an invalid value '{}'", key, value))
    })
}
