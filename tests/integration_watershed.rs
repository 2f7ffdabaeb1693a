//! End-to-end tests for watershed classification
//!
//! Drives the public API from a field table and reference table on disk
//! through to the LU6, CH and FB outputs and the JSON run summary.

use landuse_classifier::config::CompressionAlgorithm;
use landuse_classifier::processor::RUN_SUMMARY_FILE;
use landuse_classifier::table::{i64_column, read_table, string_column};
use landuse_classifier::{
    AgClass, ClassificationStatus, ClassifierConfig, CodeLookupTable, FieldRecord, LandUseConfig,
    LandUseError, OutputFormat, WatershedProcessor, classify,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const LOOKUP_CSV: &str = "Value,ROTVAL,PrimeName,OneName\n\
1,C,Corn,Other\n\
5,B,Soybeans,Other\n\
24,W,Winter Wheat,Other\n\
141,F,Deciduous Forest,Other\n\
176,P,Grass/Pasture,Perennial\n";

const FIELDS_CSV: &str = "FBndID,Acres,maj2015,pct2015,maj2016,pct2016,maj2017,pct2017,maj2018,pct2018,maj2019,pct2019,maj2020,pct2020\n\
F1,40,1,95,5,95,1,95,5,95,1,95,5,95\n\
F2,30,176,90,176,90,176,90,176,90,176,90,176,90\n\
F3,25,141,99,141,99,141,99,141,99,141,99,141,99\n\
F4,3,1,90,1,90,1,90,1,90,1,90,1,90\n";

/// Input directory holding one watershed table and the reference table
fn create_input(temp_dir: &TempDir) -> (PathBuf, PathBuf) {
    let input = temp_dir.path().join("huc");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("fields_102300030507.csv"), FIELDS_CSV).unwrap();

    let lookup = input.join("cdl_lookup.csv");
    fs::write(&lookup, LOOKUP_CSV).unwrap();
    (input, lookup)
}

fn strings(path: &Path, column: &str) -> Vec<String> {
    let df = read_table(path).unwrap();
    string_column(&df, column)
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap_or_default())
        .collect()
}

#[tokio::test]
async fn test_watershed_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let (input, lookup) = create_input(&temp_dir);
    let output = temp_dir.path().join("landuse");

    let config = LandUseConfig::default()
        .with_lookup_table(lookup)
        .with_workers(1);
    let processor = WatershedProcessor::new(input, Some(output.clone()), config).unwrap();
    let stats = processor.process().await.unwrap();

    // The reference table beside the inputs is not mistaken for a watershed
    assert_eq!(stats.watersheds_processed, 1);
    assert_eq!(stats.watersheds_failed, 0);
    assert_eq!(stats.fields_processed, 4);
    assert_eq!(stats.fields_failed, 0);

    let lu6 = output.join("LU6_102300030507.csv");
    assert_eq!(
        strings(&lu6, "GenLU"),
        vec!["Corn/Soybeans", "Pasture|Grass|Hay", "Forest", "LT 5 ac"]
    );
    assert_eq!(
        strings(&lu6, "AgLandUse"),
        vec!["Corn/Soybeans", "Pasture|Grass|Hay", "nonAg-Forest", "LT 5 ac"]
    );
    assert_eq!(strings(&lu6, "CropRotatn")[0], "CBCBCB");
    assert_eq!(strings(&lu6, "CropSumry")[0], "C3B3");
    assert_eq!(strings(&lu6, "CCCount")[0], "0:5");
    assert_eq!(strings(&lu6, "MixCount")[0], "0:6");

    let fb = read_table(&output.join("FB_102300030507.csv")).unwrap();
    let flags = i64_column(&fb, "isAG").unwrap();
    assert_eq!(&flags[..3], &[Some(1), Some(2), Some(0)]);

    let ch = read_table(&output.join("CH_102300030507.csv")).unwrap();
    assert_eq!(ch.width(), 1 + 2 * 6);

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output.join(RUN_SUMMARY_FILE)).unwrap()).unwrap();
    assert_eq!(summary["watersheds_processed"], 1);
    assert_eq!(summary["watersheds"][0]["watershed_id"], "102300030507");
}

#[tokio::test]
async fn test_parquet_outputs_with_custom_threshold() {
    let temp_dir = TempDir::new().unwrap();
    let (input, lookup) = create_input(&temp_dir);
    let output = temp_dir.path().join("parquet");

    let config = LandUseConfig::default()
        .with_lookup_table(lookup)
        .with_output_format(OutputFormat::Parquet)
        .with_compression(CompressionAlgorithm::Snappy)
        .with_classifier(ClassifierConfig::default().with_low_area_threshold(2.0))
        .without_summary();
    let processor = WatershedProcessor::new(input, Some(output.clone()), config).unwrap();
    processor.process().await.unwrap();

    assert!(!output.join(RUN_SUMMARY_FILE).exists());
    let general = strings(&output.join("LU6_102300030507.parquet"), "GenLU");
    assert_eq!(general[3], "Continuous Corn");
}

#[tokio::test]
async fn test_malformed_lookup_table_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let (input, lookup) = create_input(&temp_dir);
    fs::write(&lookup, "Value,ROTVAL,PrimeName\n1,C,Corn\n").unwrap();

    let config = LandUseConfig::default().with_lookup_table(lookup);
    match WatershedProcessor::new(input, None, config) {
        Err(LandUseError::LookupTable { reason, .. }) => assert!(reason.contains("OneName")),
        other => panic!("Expected LookupTable error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_classify_with_loaded_lookup() {
    let temp_dir = TempDir::new().unwrap();
    let (_, lookup_path) = create_input(&temp_dir);
    let lookup = CodeLookupTable::load(&lookup_path).unwrap();

    let pairs: Vec<_> = [1, 1, 1, 1, 1, 1]
        .iter()
        .map(|c| (Some(*c), Some(60.0)))
        .collect();
    let field = FieldRecord::from_pairs("F9", 12.0, &pairs);

    let record = classify(field, &lookup, &ClassifierConfig::default()).unwrap();
    assert_eq!(record.summary, "C6");
    assert_eq!(record.corn_after_corn, "5:5");
    assert_eq!(record.low_coverage, "6:6");
    assert_eq!(record.ag_class, AgClass::Cropland);
    assert_eq!(record.status, ClassificationStatus::Classified);

    let unknown = FieldRecord::from_pairs("F10", 12.0, &[(Some(999), Some(90.0)); 6]);
    assert!(matches!(
        classify(unknown, &lookup, &ClassifierConfig::default()),
        Err(LandUseError::UnknownCode { .. })
    ));
}
