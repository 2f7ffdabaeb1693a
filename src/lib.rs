//! Land-Use Classifier Library
//!
//! Classifies agricultural fields into general and detailed land-use
//! categories from six consecutive years of majority land-cover codes.
//!
//! This library provides tools for:
//! - Resolving land-cover codes through a reference lookup table
//! - Deriving each field's rotation string, rotation summary,
//!   corn-after-corn count and low-coverage count
//! - Assigning land use through ordered override rules and a
//!   data-driven rotation pattern table
//! - Reading per-watershed field tables and writing LU6, CH and FB
//!   output tables as CSV or Parquet
//!
//! ```no_run
//! use landuse_classifier::{ClassifierConfig, CodeLookupTable, FieldRecord, classify};
//!
//! let lookup = CodeLookupTable::builtin();
//! let field = FieldRecord::from_pairs(
//!     "F1",
//!     40.0,
//!     &[(Some(1), Some(90.0)), (Some(5), Some(90.0)), (Some(1), Some(90.0)),
//!       (Some(5), Some(90.0)), (Some(1), Some(90.0)), (Some(5), Some(90.0))],
//! );
//! let classified = classify(field, &lookup, &ClassifierConfig::default()).unwrap();
//! assert_eq!(classified.land_use.general, "Corn/Soybeans");
//! ```

pub mod classifier;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod lookup;
pub mod models;
pub mod processor;
pub mod table;

// Re-export commonly used types
pub use classifier::{BatchOutcome, RotationClassifier, classify};
pub use config::{ClassifierConfig, LandUseConfig, OutputFormat};
pub use error::{LandUseError, Result};
pub use lookup::CodeLookupTable;
pub use models::{
    AgClass, Category, ClassificationStatus, CodeLookupEntry, FieldFailure, FieldRecord,
    FieldYearObservation, LandUse, ProcessingStats, WatershedSummary,
};
pub use processor::WatershedProcessor;
