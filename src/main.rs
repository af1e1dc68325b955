//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `rtt_geoloc` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use rtt_geoloc::initialization::init_logger_with;
use rtt_geoloc::{run_geolocation, Config, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // This allows setting ATLAS_API_KEY and GOOGLE_MAPS_API_KEY in .env without exporting them
    // Try loading from current directory first, then from the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    // Parse command-line arguments; API keys fall back to the environment
    let config = Config::from(Opt::parse());

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_geolocation(config).await {
        Ok(report) => {
            println!(
                "✅ Geolocated {} of {} target{} ({} unresolved, {} already processed) in {:.1}s",
                report.accepted,
                report.total_targets,
                if report.total_targets == 1 { "" } else { "s" },
                report.rejected,
                report.skipped,
                report.elapsed_seconds
            );
            println!("Results appended to {}", report.output_path.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("rtt_geoloc error: {:#}", e);
            process::exit(1);
        }
    }
}
