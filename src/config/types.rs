//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgGroup, Parser, ValueEnum};

use crate::config::constants::*;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line options.
///
/// Converted into a [`Config`] with `Config::from(opt)`; API keys missing on the
/// command line are read from `ATLAS_API_KEY` / `GOOGLE_MAPS_API_KEY`.
///
/// # Examples
///
/// ```bash
/// # Single address, ASN resolved through the GeoLite2-ASN database
/// rtt_geoloc --ip 80.249.208.1 --geoip-asn GeoLite2-ASN.mmdb --geoip-city GeoLite2-City.mmdb
///
/// # File of targets with AS relationships and manual presence data
/// rtt_geoloc --file targets.txt --relations 20240101.as-rel2.txt.bz2 --presence presence.tsv
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "rtt_geoloc",
    about = "Geo-locates border IP addresses based on latency measurements from RIPE Atlas",
    group(ArgGroup::new("target").required(true).args(["ip", "file"]))
)]
pub struct Opt {
    /// A single IP address to geo-locate
    #[arg(short, long)]
    pub ip: Option<String>,

    /// File with IP addresses to geo-locate (one per line, optional ASN in a second column)
    #[arg(short, long, value_parser)]
    pub file: Option<PathBuf>,

    /// ASN of the address given with --ip (skips the GeoIP ASN lookup)
    #[arg(long, requires = "ip")]
    pub asn: Option<u32>,

    /// AS relationships file in CAIDA format (pipe-delimited, optionally .bz2 or .gz)
    #[arg(short, long, value_parser)]
    pub relations: Option<PathBuf>,

    /// AS presence file (ASN<TAB>City<TAB>Country)
    #[arg(short, long, value_parser)]
    pub presence: Option<PathBuf>,

    /// MaxMind GeoLite2-City database (.mmdb)
    #[arg(long, value_parser)]
    pub geoip_city: Option<PathBuf>,

    /// MaxMind GeoLite2-ASN database (.mmdb)
    #[arg(long, value_parser)]
    pub geoip_asn: Option<PathBuf>,

    /// World cities population file (optionally .gz) used when GeoIP knows only the country
    #[arg(long, value_parser)]
    pub world_cities: Option<PathBuf>,

    /// File where geolocation results are appended
    #[arg(short, long, value_parser, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Directory for the geocoding caches
    #[arg(long, value_parser, default_value = DEFAULT_CACHE_DIR)]
    pub cache_dir: PathBuf,

    /// RIPE Atlas API key
    #[arg(long)]
    pub atlas_api_key: Option<String>,

    /// Google Maps Geocoding API key
    #[arg(long)]
    pub google_maps_api_key: Option<String>,

    /// Probes selected per candidate location
    #[arg(long, default_value_t = DEFAULT_PROBES_PER_LOCATION)]
    pub probes_per_location: usize,

    /// Ping packets per probe
    #[arg(long, default_value_t = DEFAULT_PACKETS)]
    pub packets: u32,

    /// Maximum probes per measurement request
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Search radius around a candidate location in km
    #[arg(long, default_value_t = DEFAULT_RADIUS_KM)]
    pub radius_km: f64,

    /// A location is accepted when the minimum RTT is below this value (ms)
    #[arg(long, default_value_t = DEFAULT_ACCEPT_THRESHOLD_MS)]
    pub accept_threshold_ms: f64,

    /// Stop probing further batches once an RTT below this value (ms) is seen
    #[arg(long, default_value_t = DEFAULT_SHORT_CIRCUIT_MS)]
    pub short_circuit_ms: f64,

    /// Seed for probe sampling (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Prefer networks not selected yet when filling the per-location budget randomly
    #[arg(long)]
    pub diversify_fill: bool,

    /// Do not substitute the ASN registered for exchange fabric addresses
    #[arg(long)]
    pub no_fabric_asn: bool,

    /// Seconds between two status checks of a running measurement
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
    pub poll_interval_secs: u64,

    /// Status checks before partial measurement results are collected
    #[arg(long, default_value_t = DEFAULT_MAX_POLLS)]
    pub max_polls: u32,

    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value_t = HTTP_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without any CLI dependencies.
///
/// # Examples
///
/// ```no_run
/// use rtt_geoloc::Config;
///
/// let config = Config {
///     target_ip: Some("80.249.208.1".to_string()),
///     target_asn: Some(1200),
///     accept_threshold_ms: 5.0,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Single target address
    pub target_ip: Option<String>,

    /// File with target addresses
    pub target_file: Option<PathBuf>,

    /// ASN of `target_ip`, when known
    pub target_asn: Option<u32>,

    /// AS relationships file
    pub relations: Option<PathBuf>,

    /// Manual presence file
    pub presence: Option<PathBuf>,

    /// GeoLite2-City database
    pub geoip_city: Option<PathBuf>,

    /// GeoLite2-ASN database
    pub geoip_asn: Option<PathBuf>,

    /// World cities population file
    pub world_cities: Option<PathBuf>,

    /// Output file (append-only)
    pub output: PathBuf,

    /// Directory for the geocoding caches
    pub cache_dir: PathBuf,

    /// RIPE Atlas API key
    pub atlas_api_key: Option<String>,

    /// Google Maps API key
    pub google_maps_api_key: Option<String>,

    /// Probe budget per candidate location
    pub probes_per_location: usize,

    /// Ping packets per probe
    pub packets: u32,

    /// Probes per measurement request
    pub chunk_size: usize,

    /// Search radius in km
    pub radius_km: f64,

    /// Acceptance threshold in ms
    pub accept_threshold_ms: f64,

    /// Early-exit threshold in ms
    pub short_circuit_ms: f64,

    /// Sampling seed
    pub seed: Option<u64>,

    /// Prefer unselected networks during random fill
    pub diversify_fill: bool,

    /// Substitute the exchange fabric ASN for IXP LAN addresses
    pub substitute_fabric_asn: bool,

    /// Delay between measurement status checks
    pub poll_interval: Duration,

    /// Status checks before collecting partial results
    pub max_polls: u32,

    /// Per-request HTTP timeout in seconds
    pub timeout_seconds: u64,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_ip: None,
            target_file: None,
            target_asn: None,
            relations: None,
            presence: None,
            geoip_city: None,
            geoip_asn: None,
            world_cities: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            atlas_api_key: None,
            google_maps_api_key: None,
            probes_per_location: DEFAULT_PROBES_PER_LOCATION,
            packets: DEFAULT_PACKETS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            radius_km: DEFAULT_RADIUS_KM,
            accept_threshold_ms: DEFAULT_ACCEPT_THRESHOLD_MS,
            short_circuit_ms: DEFAULT_SHORT_CIRCUIT_MS,
            seed: None,
            diversify_fill: false,
            substitute_fabric_asn: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
            timeout_seconds: HTTP_TIMEOUT_SECS,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        Self {
            target_ip: opt.ip,
            target_file: opt.file,
            target_asn: opt.asn,
            relations: opt.relations,
            presence: opt.presence,
            geoip_city: opt.geoip_city,
            geoip_asn: opt.geoip_asn,
            world_cities: opt.world_cities,
            output: opt.output,
            cache_dir: opt.cache_dir,
            atlas_api_key: opt
                .atlas_api_key
                .or_else(|| non_empty_env(ATLAS_API_KEY_ENV)),
            google_maps_api_key: opt
                .google_maps_api_key
                .or_else(|| non_empty_env(GOOGLE_MAPS_API_KEY_ENV)),
            probes_per_location: opt.probes_per_location,
            packets: opt.packets,
            chunk_size: opt.chunk_size,
            radius_km: opt.radius_km,
            accept_threshold_ms: opt.accept_threshold_ms,
            short_circuit_ms: opt.short_circuit_ms,
            seed: opt.seed,
            diversify_fill: opt.diversify_fill,
            substitute_fabric_asn: !opt.no_fabric_asn,
            poll_interval: Duration::from_secs(opt.poll_interval_secs),
            max_polls: opt.max_polls,
            timeout_seconds: opt.timeout_seconds,
            log_level: opt.log_level,
            log_format: opt.log_format,
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
