use clap::Parser;
use landuse_classifier::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        tokio::select! {
            result = commands::run(args) => result,
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    eprintln!("\nReceived CTRL+C, shutting down...");
                    Err(anyhow::anyhow!("Processing interrupted by user"))
                }
                Err(e) => Err(anyhow::anyhow!("Failed to listen for CTRL+C: {}", e)),
            },
        }
    });

    match result {
        Ok(stats) if stats.watersheds_failed > 0 => process::exit(2),
        Ok(_) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
