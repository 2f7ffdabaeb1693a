//! Application constants for the land-use classifier
//!
//! This module contains the rotation window, default thresholds, reserved
//! rotation symbols, table column names and the fixed land-use labels used
//! throughout the classifier.

// =============================================================================
// Rotation Window
// =============================================================================

/// Number of years in the classification window
pub const WINDOW_YEARS: usize = 6;

/// Adjacent year pairs in the window (denominator of the corn-after-corn count)
pub const WINDOW_TRANSITIONS: usize = WINDOW_YEARS - 1;

/// Default minimum field area in acres; fields at or below are not classified
pub const DEFAULT_LOW_AREA_THRESHOLD: f64 = 5.0;

/// Default majority coverage percent below which a year counts as mixed
pub const DEFAULT_LOW_COVERAGE_THRESHOLD: f64 = 75.0;

/// Canonical symbol scan order for rotation summaries
///
/// Corn and soybeans lead; the remaining symbols follow alphabetically.
/// `S`, `Y` and `Z` are not rotation symbols.
pub const CANONICAL_SCAN_ORDER: &str = "CBADEFGHIJKLMNOPQRTUVWX";

// =============================================================================
// Rotation Symbols
// =============================================================================

/// Rotation symbols with fixed meaning in the override rules
pub mod symbols {
    pub const CORN: char = 'C';
    pub const SOYBEANS: char = 'B';
    pub const PASTURE: char = 'P';
    pub const FOREST: char = 'F';
    pub const URBAN: char = 'U';
    pub const WATER: char = 'T';

    /// Reserved symbol for null, empty or zero codes
    pub const NO_DATA: char = 'X';
}

/// Land-cover codes with fixed meaning
pub mod codes {
    /// Reserved "no data" code
    pub const NO_DATA: i64 = 0;

    /// Primary corn code
    pub const CORN: i64 = 1;

    /// Corn variants folded into [`CORN`] before ranking
    pub const CORN_VARIANTS: &[i64] = &[12, 13];
}

/// Display name of the reserved no-data entry
pub const NO_DATA_NAME: &str = "X";

// =============================================================================
// Table Columns
// =============================================================================

/// Column names of the code lookup reference table
pub mod lookup_columns {
    pub const CODE: &str = "Value";
    pub const ROTATION_SYMBOL: &str = "ROTVAL";
    pub const PRIME_NAME: &str = "PrimeName";
    pub const CATEGORY: &str = "OneName";
}

/// Category tags used in the reference table
pub mod category_tags {
    pub const DOUBLE_CROP: &str = "DblCrop";
    pub const PERENNIAL: &str = "Perennial";
}

/// Column names of the per-watershed field tables
pub mod field_columns {
    pub const FIELD_ID: &str = "FBndID";
    pub const OBJECT_ID: &str = "OBJECTID";
    pub const ACRES: &str = "Acres";
    pub const IS_AG: &str = "isAG";
    pub const GENERAL_LAND_USE: &str = "GenLU";
    pub const DETAILED_LAND_USE: &str = "AgLandUse";
    pub const ROTATION: &str = "CropRotatn";
    pub const SUMMARY: &str = "CropSumry";
    pub const CORN_AFTER_CORN: &str = "CCCount";
    pub const LOW_COVERAGE: &str = "MixCount";

    /// Prefix of the per-year majority code columns (`maj17`)
    pub const MAJORITY_PREFIX: &str = "maj";

    /// Prefix of the per-year coverage percent columns (`pct17`)
    pub const PERCENT_PREFIX: &str = "pct";
}

/// Output table name prefixes
pub mod output_tables {
    /// Six-year land-use summary
    pub const LAND_USE: &str = "LU6";
    /// Full crop history
    pub const CROP_HISTORY: &str = "CH";
    /// Field boundary attributes
    pub const FIELD_BOUNDARY: &str = "FB";
}

// =============================================================================
// Land-Use Labels
// =============================================================================

pub mod labels {
    pub const URBAN: &str = "Urban";
    pub const URBAN_DETAIL: &str = "nonAg-Developed";
    pub const WATER: &str = "Water/wetland";
    pub const WATER_DETAIL: &str = "nonAg-Water/Wetland";
    pub const FOREST: &str = "Forest";
    pub const FOREST_DETAIL: &str = "nonAg-Forest";
    pub const NON_AG: &str = "nonAg";
    pub const PASTURE: &str = "Pasture|Grass|Hay";
    pub const FLOOD_PRONE: &str = "Flood-prone Cropland";
    pub const FLOOD_PRONE_PREFIX: &str = "Flood-prone ";
    pub const CORN_SOYBEANS: &str = "Corn/Soybeans";
    pub const CORN_SOYBEANS_PERENNIAL: &str = "Corn/Soybeans/Perennial";
    pub const CONTINUOUS_PREFIX: &str = "Cnt";
    pub const MIXED_AGRICULTURE: &str = "Mixed Agriculture";
}

// =============================================================================
// Environment
// =============================================================================

pub mod env_vars {
    pub const LOW_AREA_THRESHOLD: &str = "LANDUSE_LOW_AREA_THRESHOLD";
    pub const LOW_COVERAGE_THRESHOLD: &str = "LANDUSE_LOW_COVERAGE_THRESHOLD";
    pub const WORKERS: &str = "LANDUSE_WORKERS";
}

/// Application directory name under the user config directory
pub const APP_DIR_NAME: &str = "landuse-classifier";

/// Default glob for watershed field tables
pub const DEFAULT_FILE_PATTERN: &str = "*";
