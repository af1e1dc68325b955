//! rtt_geoloc library: presence-informed latency geolocation
//!
//! This library geolocates IP addresses of network interconnections. Presence
//! hints for the announcing network (PeeringDB facilities and exchanges, GeoIP,
//! a manual presence file) give a set of candidate cities; RIPE Atlas probes
//! near those cities ping the target, and the city of the probe with the lowest
//! RTT is adopted when that RTT is below a threshold.
//!
//! # Example
//!
//! ```no_run
//! use rtt_geoloc::{run_geolocation, Config};
//! use tokio;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     target_file: Some(std::path::PathBuf::from("targets.txt")),
//!     relations: Some(std::path::PathBuf::from("20240101.as-rel2.txt.gz")),
//!     accept_threshold_ms: 5.0,
//!     ..Default::default()
//! };
//!
//! let report = run_geolocation(config).await?;
//! println!("Geolocated {} of {} targets, results in {}",
//!          report.accepted, report.total_targets, report.output_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

mod app;
pub mod atlas;
pub mod config;
pub mod distance;
pub mod error_handling;
pub mod geocode;
pub mod geoip;
mod http;
pub mod inference;
pub mod initialization;
pub mod models;
pub mod output;
pub mod peeringdb;
pub mod presence;
pub mod probing;
pub mod relationships;
mod run;
pub mod selection;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, Opt};
pub use run::{
    init_pipeline, parse_targets, read_targets, run_geolocation, run_targets, Collaborators,
    DefaultPipeline, GeolocationPipeline, GeolocationReport, PipelineSettings, Target,
};
