//! Command implementation for the land-use classifier CLI
//!
//! Sets up logging, resolves the layered configuration and drives the
//! watershed processor.

use crate::cli::args::Args;
use crate::models::ProcessingStats;
use crate::processor::WatershedProcessor;
use anyhow::Context;
use tracing::{debug, info, warn};

/// Main command runner
///
/// 1. Set up logging
/// 2. Load configuration (file, environment, arguments)
/// 3. Classify every discovered watershed
pub async fn run(args: Args) -> anyhow::Result<ProcessingStats> {
    setup_logging(&args)?;

    info!("Starting land-use classifier");
    debug!("Command line arguments: {:?}", args);

    let config = args
        .load_config()
        .context("Failed to load configuration")?;
    debug!("Loaded configuration: {:?}", config);

    let processor = WatershedProcessor::new(args.input.clone(), args.output.clone(), config)
        .with_context(|| format!("Failed to prepare input {}", args.input.display()))?;

    let stats = processor
        .process()
        .await
        .context("Land-use classification failed")?;

    if stats.watersheds_failed > 0 {
        warn!(
            "{} of {} watersheds failed, see {} for details",
            stats.watersheds_failed,
            stats.watersheds_processed + stats.watersheds_failed,
            processor.output_path().display()
        );
    }

    Ok(stats)
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) -> anyhow::Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("landuse_classifier={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .context("Failed to initialise logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to initialise logging")?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}
