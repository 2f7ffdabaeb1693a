//! Rotation classifier.
//!
//! Derives the rotation string, summary, anomaly counts and two-level
//! land-use label for each field from its six-year window. Classification
//! is a pure function of the window, the field area, the lookup table and
//! the thresholds; fields are independent and may be classified in
//! parallel.

pub mod evidence;
pub mod patterns;
pub mod ranking;
pub mod rotation;
pub mod rules;

#[cfg(test)]
pub mod tests;

use self::evidence::Evidence;
use self::patterns::{RotationShape, render};
use self::ranking::rank_and_resolve;
use self::rotation::{
    corn_after_corn_ratio, encode_summary, low_coverage_ratio, low_coverage_years,
    rotation_string,
};
use self::rules::{Assignment, first_override};

use crate::config::ClassifierConfig;
use crate::constants::WINDOW_YEARS;
use crate::error::{LandUseError, Result};
use crate::lookup::CodeLookupTable;
use crate::models::{AgClass, ClassificationStatus, FieldFailure, FieldRecord, LandUse};

use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, warn};

/// Rule name recorded for fields stopped by the area gate
pub const AREA_GATE_RULE: &str = "area-gate";

/// Records and per-field failures from a batch
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Classified records, in input order
    pub records: Vec<FieldRecord>,
    pub failures: Vec<FieldFailure>,
}

impl BatchOutcome {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Classifier bound to a lookup table and thresholds
#[derive(Debug, Clone)]
pub struct RotationClassifier {
    lookup: Arc<CodeLookupTable>,
    config: ClassifierConfig,
}

impl RotationClassifier {
    pub fn new(lookup: Arc<CodeLookupTable>, config: ClassifierConfig) -> Self {
        Self { lookup, config }
    }

    pub fn lookup(&self) -> &CodeLookupTable {
        &self.lookup
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify one field, returning it with every derived field populated
    pub fn classify(&self, field: FieldRecord) -> Result<FieldRecord> {
        classify_field(field, &self.lookup, &self.config)
    }

    /// Classify a batch of fields in parallel
    ///
    /// A failing field is reported in `failures` and does not affect its
    /// siblings.
    pub fn classify_all(&self, fields: Vec<FieldRecord>) -> BatchOutcome {
        let results: Vec<(String, Result<FieldRecord>)> = fields
            .into_par_iter()
            .map(|field| (field.field_id.clone(), self.classify(field)))
            .collect();

        let mut outcome = BatchOutcome::default();
        for (field_id, result) in results {
            match result {
                Ok(record) => outcome.records.push(record),
                Err(e) => {
                    warn!("Field {} failed classification: {}", field_id, e);
                    outcome.failures.push(FieldFailure {
                        field_id,
                        reason: e.to_string(),
                    });
                }
            }
        }
        outcome
    }
}

/// Classify one field against a lookup table and thresholds
pub fn classify(
    field: FieldRecord,
    lookup: &CodeLookupTable,
    config: &ClassifierConfig,
) -> Result<FieldRecord> {
    classify_field(field, lookup, config)
}

/// Derive rotation fields and land use for one field
fn classify_field(
    mut field: FieldRecord,
    lookup: &CodeLookupTable,
    config: &ClassifierConfig,
) -> Result<FieldRecord> {
    if field.observations.len() != WINDOW_YEARS {
        return Err(LandUseError::InvalidWindow {
            field_id: field.field_id.clone(),
            expected: WINDOW_YEARS,
            found: field.observations.len(),
        });
    }

    field.reset_derived();

    if !field.area_acres.is_finite() {
        warn!(
            "Field {} has a non-finite area ({}), treating as 0 ac",
            field.field_id, field.area_acres
        );
        field.area_acres = 0.0;
    }

    if field.area_acres <= config.low_area_threshold {
        field.land_use = LandUse::uniform(config.below_threshold_label());
        field.status = ClassificationStatus::BelowAreaThreshold;
        field.matched_rule = Some(AREA_GATE_RULE.to_string());
        debug!(
            "Field {} below area threshold ({} ac)",
            field.field_id, field.area_acres
        );
        return Ok(field);
    }

    let codes: Vec<Option<i64>> = field.majority_codes().collect();
    let Some(rotation) = rotation_string(&codes, lookup)? else {
        field.status = ClassificationStatus::IncompleteHistory;
        debug!("Field {} has an incomplete history", field.field_id);
        return Ok(field);
    };

    let coverage: Vec<Option<f64>> = field.coverage_percents().collect();
    let threshold = config.low_coverage_threshold;
    let window: Vec<i64> = codes.iter().flatten().copied().collect();

    let (rule, assignment) = {
        let ranked = rank_and_resolve(&window, lookup)?;
        let evidence = Evidence::new(
            &rotation,
            ranked,
            low_coverage_years(&coverage, threshold),
        );
        match first_override(&evidence) {
            Some(rule) => (rule.name.to_string(), (rule.assign)(&evidence)),
            None => general_assignment(&evidence),
        }
    };

    field.summary = encode_summary(&rotation, lookup.scan_order());
    field.corn_after_corn = corn_after_corn_ratio(&rotation);
    field.low_coverage = low_coverage_ratio(&coverage, threshold);
    field.rotation = rotation;
    field.land_use = assignment.land_use;
    field.ag_class = assignment.ag_class;
    field.status = ClassificationStatus::Classified;

    debug!(
        "Field {} {} -> {} [{}]",
        field.field_id, field.rotation, field.land_use.general, rule
    );
    field.matched_rule = Some(rule);

    Ok(field)
}

/// General rotation table lookup for fields no override claimed
fn general_assignment(evidence: &Evidence) -> (String, Assignment) {
    let shape = RotationShape::from_counts(&evidence.counts());
    let (general, detailed) = shape.table().select(evidence);
    let names = evidence.top_names();

    (
        format!("rotation {}", shape.name()),
        Assignment::new(
            LandUse::new(render(general, &names), render(detailed, &names)),
            AgClass::Cropland,
        ),
    )
}
