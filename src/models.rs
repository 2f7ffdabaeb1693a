//! Core data structures for land-use classification.
//!
//! Defines lookup entries, per-year field observations, the field record
//! that accumulates derived rotation fields, and the run statistics
//! reported by the batch processor.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::constants::category_tags;

/// Coarse category tag of a land-cover code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    DoubleCrop,
    Perennial,
    Other,
}

impl Category {
    /// Parse the category tag column of the reference table
    ///
    /// Only `DblCrop` and `Perennial` carry meaning; every other tag
    /// (including crop names used as tags) collapses to `Other`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            t if t.eq_ignore_ascii_case(category_tags::DOUBLE_CROP) => Category::DoubleCrop,
            t if t.eq_ignore_ascii_case("DoubleCrop") => Category::DoubleCrop,
            t if t.eq_ignore_ascii_case(category_tags::PERENNIAL) => Category::Perennial,
            _ => Category::Other,
        }
    }
}

/// One row of the code lookup reference table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeLookupEntry {
    pub code: i64,
    pub rotation_symbol: char,
    pub prime_name: String,
    pub category: Category,
}

impl CodeLookupEntry {
    pub fn new(
        code: i64,
        rotation_symbol: char,
        prime_name: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            code,
            rotation_symbol,
            prime_name: prime_name.into(),
            category,
        }
    }

    pub fn is_double_crop(&self) -> bool {
        self.category == Category::DoubleCrop
    }

    pub fn is_perennial(&self) -> bool {
        self.category == Category::Perennial
    }
}

/// Majority land cover of one field in one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldYearObservation {
    pub field_id: String,
    /// Ordinal within the window (0 = oldest)
    pub year: usize,
    /// Calendar year when the source table names it
    pub calendar_year: Option<u16>,
    pub majority_code: Option<i64>,
    pub coverage_percent: Option<f64>,
}

/// Agricultural flag of a classified field
///
/// Serialised as the tri-state `isAG` column: 0 non-agricultural,
/// 1 cropland, 2 pasture/grass/hay or flood-prone cropland.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AgClass {
    #[default]
    NonAg,
    Cropland,
    Grassland,
}

impl AgClass {
    pub fn flag(&self) -> i32 {
        match self {
            AgClass::NonAg => 0,
            AgClass::Cropland => 1,
            AgClass::Grassland => 2,
        }
    }

    pub fn is_agricultural(&self) -> bool {
        !matches!(self, AgClass::NonAg)
    }
}

/// General and detailed land-use labels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandUse {
    pub general: String,
    pub detailed: String,
}

impl LandUse {
    pub fn new(general: impl Into<String>, detailed: impl Into<String>) -> Self {
        Self {
            general: general.into(),
            detailed: detailed.into(),
        }
    }

    /// Same label at both granularities
    pub fn uniform(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            general: label.clone(),
            detailed: label,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.general.is_empty() && self.detailed.is_empty()
    }
}

/// How far classification got for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClassificationStatus {
    #[default]
    Pending,
    /// Area at or below the configured minimum
    BelowAreaThreshold,
    /// At least one year has no majority code
    IncompleteHistory,
    Classified,
}

/// One field with its six-year window and derived land-use fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub field_id: String,
    pub area_acres: f64,
    /// The six-year classification window, oldest first
    pub observations: Vec<FieldYearObservation>,
    /// Every year available for the field, oldest first
    pub history: Vec<FieldYearObservation>,

    pub rotation: String,
    pub summary: String,
    pub corn_after_corn: String,
    pub low_coverage: String,
    pub land_use: LandUse,
    pub ag_class: AgClass,
    pub status: ClassificationStatus,
    /// Name of the decision rule that assigned the land use
    pub matched_rule: Option<String>,
}

impl FieldRecord {
    /// Create a record from its window observations
    pub fn new(
        field_id: impl Into<String>,
        area_acres: f64,
        observations: Vec<FieldYearObservation>,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            area_acres,
            history: observations.clone(),
            observations,
            rotation: String::new(),
            summary: String::new(),
            corn_after_corn: String::new(),
            low_coverage: String::new(),
            land_use: LandUse::default(),
            ag_class: AgClass::NonAg,
            status: ClassificationStatus::Pending,
            matched_rule: None,
        }
    }

    /// Create a record from `(majority code, coverage percent)` pairs, oldest first
    pub fn from_pairs(
        field_id: impl Into<String>,
        area_acres: f64,
        pairs: &[(Option<i64>, Option<f64>)],
    ) -> Self {
        let field_id = field_id.into();
        let observations = pairs
            .iter()
            .enumerate()
            .map(|(year, (code, pct))| FieldYearObservation {
                field_id: field_id.clone(),
                year,
                calendar_year: None,
                majority_code: *code,
                coverage_percent: *pct,
            })
            .collect();
        Self::new(field_id, area_acres, observations)
    }

    /// Attach the full multi-year history (defaults to the window)
    pub fn with_history(mut self, history: Vec<FieldYearObservation>) -> Self {
        self.history = history;
        self
    }

    /// Clear every derived field
    pub fn reset_derived(&mut self) {
        self.rotation.clear();
        self.summary.clear();
        self.corn_after_corn.clear();
        self.low_coverage.clear();
        self.land_use = LandUse::default();
        self.ag_class = AgClass::NonAg;
        self.status = ClassificationStatus::Pending;
        self.matched_rule = None;
    }

    pub fn is_agricultural(&self) -> bool {
        self.ag_class.is_agricultural()
    }

    pub fn majority_codes(&self) -> impl Iterator<Item = Option<i64>> + '_ {
        self.observations.iter().map(|o| o.majority_code)
    }

    pub fn coverage_percents(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.observations.iter().map(|o| o.coverage_percent)
    }
}

/// A field that could not be classified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFailure {
    pub field_id: String,
    pub reason: String,
}

/// Per-watershed processing summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatershedSummary {
    pub watershed_id: String,
    pub source_path: PathBuf,
    /// Calendar years of the classification window
    pub window_years: Vec<u16>,
    pub fields_total: usize,
    pub fields_classified: usize,
    pub fields_below_threshold: usize,
    pub fields_incomplete: usize,
    pub fields_failed: usize,
    pub agricultural_fields: usize,
    /// Field count per general land-use label
    pub land_use_counts: BTreeMap<String, usize>,
    pub failures: Vec<FieldFailure>,
    pub outputs: Vec<PathBuf>,
}

impl WatershedSummary {
    pub fn new(watershed_id: impl Into<String>, source_path: PathBuf) -> Self {
        Self {
            watershed_id: watershed_id.into(),
            source_path,
            ..Default::default()
        }
    }

    /// Tally a finished record
    pub fn record(&mut self, record: &FieldRecord) {
        self.fields_total += 1;
        match record.status {
            ClassificationStatus::BelowAreaThreshold => self.fields_below_threshold += 1,
            ClassificationStatus::IncompleteHistory => self.fields_incomplete += 1,
            ClassificationStatus::Classified => self.fields_classified += 1,
            ClassificationStatus::Pending => {}
        }
        if record.is_agricultural() {
            self.agricultural_fields += 1;
        }
        if !record.land_use.general.is_empty() {
            *self
                .land_use_counts
                .entry(record.land_use.general.clone())
                .or_insert(0) += 1;
        }
    }

    /// Tally a failed field
    pub fn record_failure(&mut self, failure: FieldFailure) {
        self.fields_total += 1;
        self.fields_failed += 1;
        self.failures.push(failure);
    }
}

/// A watershed table that could not be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatershedFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Processing statistics for a whole run
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub watersheds_processed: usize,
    pub watersheds_failed: usize,
    pub fields_processed: usize,
    pub fields_failed: usize,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
    pub watersheds: Vec<WatershedSummary>,
    pub watershed_failures: Vec<WatershedFailure>,
}

impl ProcessingStats {
    /// Fold a watershed summary into the run totals
    pub fn add_watershed(&mut self, summary: WatershedSummary) {
        self.watersheds_processed += 1;
        self.fields_processed += summary.fields_total - summary.fields_failed;
        self.fields_failed += summary.fields_failed;
        self.watersheds.push(summary);
    }

    /// Count a watershed that failed as a whole
    pub fn record_failure(&mut self, path: PathBuf, reason: impl Into<String>) {
        self.watersheds_failed += 1;
        self.watershed_failures.push(WatershedFailure {
            path,
            reason: reason.into(),
        });
    }

    /// General land-use distribution across every watershed
    pub fn land_use_totals(&self) -> BTreeMap<String, usize> {
        let mut totals = BTreeMap::new();
        for summary in &self.watersheds {
            for (label, count) in &summary.land_use_counts {
                *totals.entry(label.clone()).or_insert(0) += count;
            }
        }
        totals
    }
}
