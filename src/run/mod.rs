//! Run driver.
//!
//! Targets are processed one after the other. Each one goes through the
//! [`GeolocationPipeline`] and produces exactly one line in the output file;
//! targets already present in that file are skipped.

mod finalize;
mod init;
mod pipeline;
mod targets;

pub use init::{init_pipeline, DefaultPipeline};
pub use pipeline::{Collaborators, GeolocationPipeline, PipelineSettings};
pub use targets::{parse_targets, read_targets, Target};

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::app::log_progress;
use crate::atlas::MeasurementPlatform;
use crate::config::Config;
use crate::error_handling::{ConfigError, ProcessingStats};
use crate::geocode::Geocoder;
use crate::geoip::IpLocator;
use crate::output::{ensure_output_writable, read_processed_ips, ResultRecorder};
use crate::peeringdb::PresenceSource;

use finalize::finalize_run;

/// Results of a geolocation run.
///
/// Contains summary statistics; the per-target results are in the output
/// file.
#[derive(Debug, Clone)]
pub struct GeolocationReport {
    /// Number of targets in the input
    pub total_targets: usize,
    /// Targets skipped because the output already had them
    pub skipped: usize,
    /// Targets with an accepted location
    pub accepted: usize,
    /// Targets processed without an accepted location
    pub rejected: usize,
    /// Output file the results were appended to
    pub output_path: PathBuf,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

/// Runs a geolocation pass with the provided configuration.
///
/// This is the main entry point for the library. It loads the inputs named by
/// `config`, then geolocates every target not yet present in the output file.
///
/// # Errors
///
/// Returns an error on fatal configuration problems (missing input files or
/// API keys, no valid targets, unwritable output) and when a service rejects
/// the API key.
///
/// # Example
///
/// ```no_run
/// use rtt_geoloc::{run_geolocation, Config};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config {
///     target_ip: Some("80.249.208.1".to_string()),
///     atlas_api_key: Some("...".to_string()),
///     google_maps_api_key: Some("...".to_string()),
///     ..Default::default()
/// };
/// let report = run_geolocation(config).await?;
/// println!("{} of {} targets located", report.accepted, report.total_targets);
/// # Ok(())
/// # }
/// ```
pub async fn run_geolocation(config: Config) -> Result<GeolocationReport> {
    let (mut pipeline, targets) = init_pipeline(&config)?;
    run_targets(&mut pipeline, &targets, &config.output).await
}

/// Geolocates `targets` with `pipeline`, appending results to `output`.
///
/// # Errors
///
/// Fails when the output cannot be read back or written, and when a service
/// rejects the API key.
pub async fn run_targets<P, L, G, M>(
    pipeline: &mut GeolocationPipeline<P, L, G, M>,
    targets: &[Target],
    output: &Path,
) -> Result<GeolocationReport>
where
    P: PresenceSource,
    L: IpLocator,
    G: Geocoder,
    M: MeasurementPlatform,
{
    ensure_output_writable(output)?;
    let mut processed = read_processed_ips(output)?;
    let mut recorder = ResultRecorder::open(output)
        .map_err(|_| ConfigError::OutputNotWritable(output.to_path_buf()))?;

    let pending: Vec<IpAddr> = targets
        .iter()
        .map(|target| target.ip)
        .filter(|ip| !processed.contains(ip))
        .collect();
    pipeline.prefetch_geoip(&pending);

    let start_time = Instant::now();
    let stats = ProcessingStats::new();
    let mut skipped = 0usize;

    for (index, target) in targets.iter().enumerate() {
        if processed.contains(&target.ip) {
            debug!("{} is already in {}, skipping it", target.ip, output.display());
            skipped += 1;
            continue;
        }
        info!("Geolocating {} ({}/{})", target.ip, index + 1, targets.len());

        let result = pipeline
            .geolocate(target)
            .await
            .with_context(|| format!("Failed to geolocate {}", target.ip))?;
        recorder
            .record(&result)
            .with_context(|| format!("Failed to write to {}", recorder.path().display()))?;
        stats.increment(result.outcome);
        processed.insert(target.ip);

        log_progress(start_time, index + 1, targets.len());
    }
    if skipped > 0 {
        info!("Skipped {} targets already in {}", skipped, output.display());
    }

    Ok(finalize_run(
        &stats,
        targets.len(),
        skipped,
        start_time,
        output,
    ))
}
