//! Basic processing integration tests

use super::write_field_table;
use crate::config::{LandUseConfig, OutputFormat};
use crate::processor::{RUN_SUMMARY_FILE, WatershedProcessor};
use crate::table::{i64_column, read_table, string_column};
use std::fs;
use tempfile::TempDir;

/// Watershed with a corn/soybean field, a corn field, a small field,
/// a field with a missing year and a field with an unmapped code
fn create_watershed(temp_dir: &TempDir) -> std::path::PathBuf {
    let input = temp_dir.path().join("fields");
    write_field_table(
        &input,
        "070801050302",
        &[
            "F1,40,24,90,1,95,5,95,1,95,5,95,1,95,5,95",
            "F2,30,1,90,1,90,1,90,1,90,1,90,1,90,1,90",
            "F3,2,1,90,1,90,1,90,1,90,1,90,1,90,1,90",
            "F4,25,1,90,1,90,5,90,,,5,90,1,90,5,90",
            "F5,25,1,90,1,90,1,90,9999,90,1,90,1,90,1,90",
        ],
    );
    input
}

#[tokio::test]
async fn test_basic_processing_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_watershed(&temp_dir);
    let output = temp_dir.path().join("out");

    let processor =
        WatershedProcessor::new(input, Some(output.clone()), LandUseConfig::default().with_workers(2))
            .unwrap();
    let stats = processor.process().await.unwrap();

    assert_eq!(stats.watersheds_processed, 1);
    assert_eq!(stats.watersheds_failed, 0);
    assert_eq!(stats.fields_processed, 4);
    assert_eq!(stats.fields_failed, 1);
    assert_eq!(stats.output_path, output);

    let summary = &stats.watersheds[0];
    assert_eq!(summary.watershed_id, "070801050302");
    assert_eq!(summary.window_years, (2015..=2020).collect::<Vec<u16>>());
    assert_eq!(summary.fields_classified, 2);
    assert_eq!(summary.fields_below_threshold, 1);
    assert_eq!(summary.fields_incomplete, 1);
    assert_eq!(summary.failures[0].field_id, "F5");
    assert_eq!(summary.outputs.len(), 3);

    let lu = read_table(&output.join("LU6_070801050302.csv")).unwrap();
    let general: Vec<Option<String>> = string_column(&lu, "GenLU").unwrap();
    assert_eq!(general[0].as_deref(), Some("Corn/Soybeans"));
    assert_eq!(general[1].as_deref(), Some("Continuous Corn"));
    assert_eq!(general[2].as_deref(), Some("LT 5 ac"));

    let rotations = string_column(&lu, "CropRotatn").unwrap();
    assert_eq!(rotations[0].as_deref(), Some("CBCBCB"));

    let fb = read_table(&output.join("FB_070801050302.csv")).unwrap();
    assert_eq!(
        i64_column(&fb, "isAG").unwrap(),
        vec![Some(1), Some(1), Some(0), Some(0)]
    );

    let ch = read_table(&output.join("CH_070801050302.csv")).unwrap();
    assert_eq!(ch.width(), 1 + 7 * 2);
    assert_eq!(i64_column(&ch, "maj14").unwrap()[0], Some(24));
}

#[tokio::test]
async fn test_run_summary_json() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_watershed(&temp_dir);
    let output = temp_dir.path().join("out");

    let processor =
        WatershedProcessor::new(input, Some(output.clone()), LandUseConfig::default()).unwrap();
    processor.process().await.unwrap();

    let json = fs::read_to_string(output.join(RUN_SUMMARY_FILE)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["watersheds_processed"], 1);
    assert_eq!(value["watersheds"][0]["land_use_counts"]["Continuous Corn"], 1);
    assert_eq!(value["watersheds"][0]["failures"][0]["field_id"], "F5");
}

#[tokio::test]
async fn test_parquet_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_watershed(&temp_dir);
    let output = temp_dir.path().join("out");

    let config = LandUseConfig::default()
        .with_output_format(OutputFormat::Parquet)
        .without_summary();
    let processor = WatershedProcessor::new(input, Some(output.clone()), config).unwrap();
    processor.process().await.unwrap();

    assert!(output.join("LU6_070801050302.parquet").exists());
    assert!(!output.join(RUN_SUMMARY_FILE).exists());
}

#[tokio::test]
async fn test_multiple_watersheds() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("fields");
    for id in ["070801050101", "070801050202", "070801050303"] {
        write_field_table(
            &input.join(&id[..8]),
            id,
            &["F1,40,1,90,1,90,1,90,1,90,1,90,1,90,1,90"],
        );
    }
    let output = temp_dir.path().join("out");

    let processor =
        WatershedProcessor::new(input, Some(output.clone()), LandUseConfig::default().with_workers(3))
            .unwrap();
    let stats = processor.process().await.unwrap();

    assert_eq!(stats.watersheds_processed, 3);
    let ids: Vec<&str> = stats.watersheds.iter().map(|w| w.watershed_id.as_str()).collect();
    assert_eq!(ids, vec!["070801050101", "070801050202", "070801050303"]);
    assert_eq!(stats.land_use_totals().get("Continuous Corn"), Some(&3));
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_watershed(&temp_dir);
    let output = temp_dir.path().join("out");

    let processor =
        WatershedProcessor::new(input, Some(output.clone()), LandUseConfig::default().with_dry_run())
            .unwrap();
    let stats = processor.process().await.unwrap();

    assert_eq!(stats.watersheds_processed, 0);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_default_output_directory() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_watershed(&temp_dir);

    let processor = WatershedProcessor::new(input.clone(), None, LandUseConfig::default()).unwrap();
    assert_eq!(processor.output_path(), input.join("landuse"));

    processor.process().await.unwrap();
    assert!(input.join("landuse").join("LU6_070801050302.csv").exists());
}
