//! Error handling integration tests

use super::write_field_table;
use crate::config::LandUseConfig;
use crate::error::LandUseError;
use crate::processor::WatershedProcessor;
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn test_nonexistent_input_path() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nonexistent");

    let result = WatershedProcessor::new(missing.clone(), None, LandUseConfig::default());

    match result.unwrap_err() {
        LandUseError::WatershedNotFound { path } => assert_eq!(path, missing),
        other => panic!("Expected WatershedNotFound error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_configuration_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let result = WatershedProcessor::new(
        temp_dir.path().to_path_buf(),
        None,
        LandUseConfig::default().with_workers(0),
    );
    assert!(matches!(result, Err(LandUseError::Configuration { .. })));
}

#[tokio::test]
async fn test_missing_lookup_table() {
    let temp_dir = TempDir::new().unwrap();
    let config = LandUseConfig::default().with_lookup_table(temp_dir.path().join("lookup.csv"));

    let result = WatershedProcessor::new(temp_dir.path().to_path_buf(), None, config);
    assert!(matches!(result, Err(LandUseError::Io(_))));
}

#[tokio::test]
async fn test_empty_input_directory() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("empty");
    fs::create_dir_all(&input).unwrap();

    let processor = WatershedProcessor::new(input, None, LandUseConfig::default()).unwrap();
    let stats = processor.process().await.unwrap();

    assert_eq!(stats.watersheds_processed, 0);
    assert_eq!(stats.watersheds_failed, 0);
}

#[tokio::test]
async fn test_bad_watershed_does_not_stop_others() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("fields");
    write_field_table(
        &input,
        "070801050101",
        &["F1,40,1,90,1,90,1,90,1,90,1,90,1,90,1,90"],
    );
    fs::write(
        input.join("fields_070801050202.csv"),
        "FBndID,Acres,maj19,pct19,maj20,pct20\nF1,20,1,90,1,90\n",
    )
    .unwrap();
    let output = temp_dir.path().join("out");

    let processor =
        WatershedProcessor::new(input, Some(output.clone()), LandUseConfig::default()).unwrap();
    let stats = processor.process().await.unwrap();

    assert_eq!(stats.watersheds_processed, 1);
    assert_eq!(stats.watersheds_failed, 1);
    assert!(
        stats.watershed_failures[0]
            .path
            .to_string_lossy()
            .contains("070801050202")
    );
    assert!(output.join("LU6_070801050101.csv").exists());
}

#[tokio::test]
async fn test_existing_outputs_need_force() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("fields");
    write_field_table(
        &input,
        "070801050101",
        &["F1,40,1,90,1,90,1,90,1,90,1,90,1,90,1,90"],
    );
    let output = temp_dir.path().join("out");

    let first =
        WatershedProcessor::new(input.clone(), Some(output.clone()), LandUseConfig::default())
            .unwrap();
    first.process().await.unwrap();

    let second =
        WatershedProcessor::new(input.clone(), Some(output.clone()), LandUseConfig::default())
            .unwrap();
    let stats = second.process().await.unwrap();
    assert_eq!(stats.watersheds_failed, 1);

    let forced = WatershedProcessor::new(
        input,
        Some(output),
        LandUseConfig::default().with_force_overwrite(),
    )
    .unwrap();
    let stats = forced.process().await.unwrap();
    assert_eq!(stats.watersheds_processed, 1);
}
