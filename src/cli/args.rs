//! Command-line argument definitions for the land-use classifier
//!
//! Every option here overrides the matching configuration value; unset
//! options leave the file and environment layers untouched.

use crate::config::{CompressionAlgorithm, LandUseConfig, OutputFormat};
use crate::error::Result;
use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the land-use classifier
///
/// Classifies farm fields into general and detailed land-use categories
/// from six years of majority land-cover codes.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "landuse-classifier",
    version,
    about = "Classify field land use from six-year crop rotation histories",
    long_about = "Reads per-watershed field tables holding yearly majority land-cover codes and \
                  coverage percentages, derives each field's crop rotation, rotation summary and \
                  anomaly counts, and assigns a general and detailed land-use label. Writes LU6, \
                  CH and FB tables per watershed plus a JSON run summary."
)]
pub struct Args {
    /// Watershed field table, or a directory searched recursively for them
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output directory for the generated tables
    ///
    /// Defaults to a `landuse` directory beside the input.
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Land-cover code lookup table (CSV or Parquet)
    ///
    /// Needs `Value`, `ROTVAL`, `PrimeName` and `OneName` columns. The
    /// built-in table of common CDL codes is used when omitted.
    #[arg(short = 'l', long = "lookup", value_name = "FILE")]
    pub lookup_table: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// TOML configuration file. If not specified, looks for
    /// ~/.config/landuse-classifier/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Minimum field area in acres; smaller fields are labelled `LT <n> ac`
    #[arg(long = "min-acres", value_name = "ACRES")]
    pub low_area_threshold: Option<f64>,

    /// Coverage percent below which a year counts toward the mixed count
    #[arg(long = "coverage-threshold", value_name = "PERCENT")]
    pub low_coverage_threshold: Option<f64>,

    /// Number of watersheds processed concurrently
    #[arg(short = 'j', long = "workers", value_name = "COUNT")]
    pub workers: Option<usize>,

    /// Output table format
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Parquet compression algorithm
    #[arg(long = "compression", value_enum)]
    pub compression: Option<CompressionAlgorithm>,

    /// Glob matched against input file names
    #[arg(long = "pattern", value_name = "GLOB")]
    pub file_pattern: Option<String>,

    /// Force overwrite of existing output files
    #[arg(long = "force", help = "Force overwrite of existing output files")]
    pub force_overwrite: bool,

    /// List the watersheds that would be processed and exit
    #[arg(
        long = "dry-run",
        help = "Show what would be processed without creating output files"
    )]
    pub dry_run: bool,

    /// Skip writing run_summary.json
    #[arg(long = "no-summary")]
    pub no_summary: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Apply command-line values on top of a loaded configuration
    pub fn apply_overrides(&self, mut config: LandUseConfig) -> LandUseConfig {
        if let Some(acres) = self.low_area_threshold {
            config.classifier.low_area_threshold = acres;
        }
        if let Some(percent) = self.low_coverage_threshold {
            config.classifier.low_coverage_threshold = percent;
        }
        if let Some(path) = &self.lookup_table {
            config.processing.lookup_table = Some(path.clone());
        }
        if let Some(workers) = self.workers {
            config.processing.workers = workers;
        }
        if let Some(format) = self.format {
            config.processing.output_format = format;
        }
        if let Some(compression) = self.compression {
            config.processing.compression = compression;
        }
        if let Some(pattern) = &self.file_pattern {
            config.processing.file_pattern = pattern.clone();
        }
        if self.force_overwrite {
            config.processing.force_overwrite = true;
        }
        if self.dry_run {
            config.processing.dry_run = true;
        }
        if self.no_summary {
            config.processing.write_summary = false;
        }
        config
    }

    /// Load the layered configuration and validate it
    pub fn load_config(&self) -> Result<LandUseConfig> {
        let config = LandUseConfig::load_layered(self.config_file.as_deref())?;
        let config = self.apply_overrides(config);
        config.validate()?;
        Ok(config)
    }
}
