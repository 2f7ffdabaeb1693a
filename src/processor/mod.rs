//! Batch processing engine.
//!
//! Orchestrates the watershed workflow: discover field tables, read each
//! watershed's fields, classify them in parallel and write the output
//! tables, reporting a summary of the whole run.

pub mod discovery;
pub mod source;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::discovery::{WatershedDiscovery, WatershedTable};
use self::source::{FieldSource, TableFieldSource};
use self::writer::{FieldSink, TableSink};

use crate::classifier::RotationClassifier;
use crate::config::LandUseConfig;
use crate::error::{LandUseError, Result};
use crate::lookup::CodeLookupTable;
use crate::models::{ProcessingStats, WatershedSummary};

use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::fs;
use tokio::sync::Semaphore;
use tokio::task;
use tracing::{error, info};

/// File name of the JSON run summary
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";

/// Main processor for watershed land-use classification
#[derive(Debug)]
pub struct WatershedProcessor {
    input_path: PathBuf,
    output_path: PathBuf,
    config: LandUseConfig,
    discovery: WatershedDiscovery,
    classifier: RotationClassifier,
    sink: TableSink,
}

impl WatershedProcessor {
    /// Create a new processor
    ///
    /// The output directory defaults to `landuse/` beside the input.
    pub fn new(
        input_path: PathBuf,
        output_path: Option<PathBuf>,
        config: LandUseConfig,
    ) -> Result<Self> {
        if !input_path.exists() {
            return Err(LandUseError::WatershedNotFound { path: input_path });
        }
        config.validate()?;

        let output_path = output_path.unwrap_or_else(|| {
            let base = if input_path.is_dir() {
                input_path.as_path()
            } else {
                input_path.parent().unwrap_or_else(|| Path::new("."))
            };
            base.join("landuse")
        });

        let lookup = match &config.processing.lookup_table {
            Some(path) => CodeLookupTable::load(path)?,
            None => {
                info!("No lookup table configured, using built-in codes");
                CodeLookupTable::builtin()
            }
        };

        let mut discovery =
            WatershedDiscovery::new(input_path.clone(), &config.processing.file_pattern)?;
        if let Some(path) = &config.processing.lookup_table {
            discovery = discovery.with_excluded(path);
        }

        let classifier = RotationClassifier::new(Arc::new(lookup), config.classifier.clone());
        let sink = TableSink::new(output_path.clone(), config.processing.output_format)
            .with_compression(config.processing.compression)
            .with_force_overwrite(config.processing.force_overwrite);

        Ok(Self {
            input_path,
            output_path,
            config,
            discovery,
            classifier,
            sink,
        })
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Main processing entry point
    pub async fn process(&self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        println!(
            "{}",
            "Starting land-use classification".bright_green().bold()
        );
        println!("  {} {}", "Input:".bright_cyan(), self.input_path.display());
        println!("  {} {}", "Output:".bright_cyan(), self.output_path.display());

        // Step 1: Discover watershed tables
        println!("\n{}", "Discovering watershed tables...".bright_yellow());
        let tables = self.discovery.discover_tables().await?;
        println!(
            "  {} {} watershed tables",
            "Found".bright_green(),
            tables.len().to_string().bright_white().bold()
        );

        let mut stats = ProcessingStats {
            output_path: self.output_path.clone(),
            ..Default::default()
        };

        if tables.is_empty() {
            stats.processing_time_ms = start_time.elapsed().as_millis();
            return Ok(stats);
        }

        // Step 2: Dry run lists the watersheds only
        if self.config.processing.dry_run {
            println!("\n{}", "Dry run - nothing will be written".bright_green());
            for table in &tables {
                println!(
                    "  {} {}",
                    table.watershed_id.bright_white(),
                    table.path.display().to_string().bright_black()
                );
            }
            stats.processing_time_ms = start_time.elapsed().as_millis();
            return Ok(stats);
        }

        fs::create_dir_all(&self.output_path).await?;

        // Step 3: Classify watersheds with bounded concurrency
        println!("\n{}", "Classifying fields...".bright_yellow());
        let workers = self.config.processing.workers;
        let semaphore = Arc::new(Semaphore::new(workers));

        let pb = ProgressBar::new(tables.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let results = stream::iter(tables)
            .map(|table| {
                let sem = semaphore.clone();
                let classifier = self.classifier.clone();
                let sink = self.sink.clone();
                let pb = pb.clone();
                async move {
                    let _permit = sem.acquire().await.ok();
                    let path = table.path.clone();
                    let result = task::spawn_blocking(move || {
                        process_watershed(&table, &classifier, &sink)
                    })
                    .await
                    .map_err(|e| LandUseError::ProcessingFailed {
                        path: path.clone(),
                        reason: format!("worker task failed: {}", e),
                    })
                    .and_then(|r| r);
                    pb.inc(1);
                    (path, result)
                }
            })
            .buffer_unordered(workers)
            .collect::<Vec<_>>()
            .await;

        pb.finish_and_clear();

        for (path, result) in results {
            match result {
                Ok(summary) => stats.add_watershed(summary),
                Err(e) => {
                    error!("Watershed {} failed: {}", path.display(), e);
                    stats.record_failure(path, e.to_string());
                }
            }
        }
        stats
            .watersheds
            .sort_by(|a, b| a.watershed_id.cmp(&b.watershed_id));
        stats.processing_time_ms = start_time.elapsed().as_millis();

        // Step 4: Run summary
        if self.config.processing.write_summary {
            let summary_path = self.output_path.join(RUN_SUMMARY_FILE);
            let json = serde_json::to_string_pretty(&stats)?;
            fs::write(&summary_path, json).await?;
            info!("Wrote run summary to {}", summary_path.display());
        }

        self.print_summary(&stats);
        Ok(stats)
    }

    fn print_summary(&self, stats: &ProcessingStats) {
        println!("\n{}", "Processing Summary".bright_green().bold());
        println!(
            "  {} {}ms",
            "Time elapsed:".bright_cyan(),
            stats.processing_time_ms.to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Watersheds processed:".bright_cyan(),
            stats.watersheds_processed.to_string().bright_white()
        );
        if stats.watersheds_failed > 0 {
            println!(
                "  {} {}",
                "Watersheds failed:".bright_red(),
                stats.watersheds_failed.to_string().bright_red().bold()
            );
        }
        println!(
            "  {} {}",
            "Fields processed:".bright_cyan(),
            stats.fields_processed.to_string().bright_white().bold()
        );
        if stats.fields_failed > 0 {
            println!(
                "  {} {}",
                "Fields failed:".bright_red(),
                stats.fields_failed.to_string().bright_red().bold()
            );
        }

        let totals = stats.land_use_totals();
        if !totals.is_empty() {
            println!("\n{}", "Land use".bright_green().bold());
            let mut ranked: Vec<_> = totals.into_iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            for (label, count) in ranked.iter().take(10) {
                println!(
                    "  {:<32} {}",
                    label.bright_cyan(),
                    count.to_string().bright_white()
                );
            }
        }
    }
}

/// Read, classify and write one watershed
pub fn process_watershed<S: FieldSink>(
    table: &WatershedTable,
    classifier: &RotationClassifier,
    sink: &S,
) -> Result<WatershedSummary> {
    let source = TableFieldSource::new(table.clone())?;
    let fields = source.read_fields()?;
    let outcome = classifier.classify_all(fields.records);

    let mut summary = WatershedSummary::new(source.watershed_id(), fields.source_path);
    summary.window_years = fields.window_years;
    for record in &outcome.records {
        summary.record(record);
    }
    for failure in outcome.failures {
        summary.record_failure(failure);
    }

    summary.outputs = sink.write_watershed(&summary.watershed_id, &fields.all_years, &outcome.records)?;

    info!(
        "Watershed {}: {} fields, {} classified, {} failed",
        summary.watershed_id, summary.fields_total, summary.fields_classified, summary.fields_failed
    );
    Ok(summary)
}
