//! Classifier tests
//!
//! End-to-end checks of `RotationClassifier` against the built-in lookup
//! table: fixed scenarios, general rotation shapes and batch behaviour.


use crate::classifier::RotationClassifier;
use crate::config::ClassifierConfig;
use crate::lookup::CodeLookupTable;
use crate::models::FieldRecord;
use std::sync::Arc;

pub(crate) fn classifier() -> RotationClassifier {
    RotationClassifier::new(
        Arc::new(CodeLookupTable::builtin()),
        ClassifierConfig::default(),
    )
}

/// Twenty-acre field with the given codes at 90 % coverage
pub(crate) fn field(id: &str, codes: [i64; 6]) -> FieldRecord {
    let pairs: Vec<(Option<i64>, Option<f64>)> =
        codes.iter().map(|c| (Some(*c), Some(90.0))).collect();
    FieldRecord::from_pairs(id, 20.0, &pairs)
}

/// Classify and return `(general, detailed)`
pub(crate) fn labels(codes: [i64; 6]) -> (String, String) {
    let record = classifier().classify(field("F", codes)).unwrap();
    (record.land_use.general, record.land_use.detailed)
}
