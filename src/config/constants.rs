//! Configuration constants.
//!
//! This module defines the defaults used throughout the application: probe
//! selection radius and budget, measurement batching, acceptance thresholds,
//! collaborator endpoints and retry parameters.

use std::time::Duration;

// Vantage point selection
/// Radius in kilometers around a candidate location within which probes are considered
pub const DEFAULT_RADIUS_KM: f64 = 40.0;
/// Number of probes selected per candidate location (excluding probes in the target ASN)
pub const DEFAULT_PROBES_PER_LOCATION: usize = 10;

// Measurement batching
/// Maximum number of probes submitted in one measurement request.
/// RIPE Atlas rejects probe lists whose comma-joined value exceeds 8192 characters,
/// 100 ids stay well below that limit.
pub const DEFAULT_CHUNK_SIZE: usize = 100;
/// Number of ping packets sent by every probe
pub const DEFAULT_PACKETS: u32 = 3;
/// A running minimum RTT below this value (ms) stops further batches for the target
pub const DEFAULT_SHORT_CIRCUIT_MS: f64 = 2.0;

// Inference
/// Minimum RTT (ms) must be strictly below this value for a location to be accepted
pub const DEFAULT_ACCEPT_THRESHOLD_MS: f64 = 10.0;

// Measurement polling
/// Delay between two status checks of a running measurement
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
/// Number of status checks before partial results are collected anyway
pub const DEFAULT_MAX_POLLS: u32 = 4;
/// Description attached to every measurement created by this tool
pub const MEASUREMENT_DESCRIPTION: &str = "Presence-informed RTT geolocation";

// Network operation timeouts
/// Per-request HTTP timeout in seconds
pub const HTTP_TIMEOUT_SECS: u64 = 30;

// Retry strategy
/// Initial delay in milliseconds before first retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 15;
/// Maximum number of retries after the initial attempt
pub const RETRY_MAX_ATTEMPTS: usize = 3;

// Collaborator endpoints
/// RIPE Atlas REST API root
pub const ATLAS_API_BASE: &str = "https://atlas.ripe.net";
/// PeeringDB REST API root
pub const PEERINGDB_API_BASE: &str = "https://www.peeringdb.com/api";
/// Google Maps Geocoding API endpoint
pub const GOOGLE_GEOCODE_API_BASE: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Environment variable holding the RIPE Atlas API key
pub const ATLAS_API_KEY_ENV: &str = "ATLAS_API_KEY";
/// Environment variable holding the Google Maps API key
pub const GOOGLE_MAPS_API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

// On-disk caches
/// Default directory for geocoding append logs
pub const DEFAULT_CACHE_DIR: &str = ".geocode_cache";
/// Forward geocoding log (location key -> coordinates)
pub const FORWARD_CACHE_FILE: &str = "location_coordinates.tsv";
/// Reverse geocoding log (coordinates -> locality)
pub const REVERSE_CACHE_FILE: &str = "coordinates_locations.tsv";

// Output
/// Default output path
pub const DEFAULT_OUTPUT: &str = "./geolocation.tsv";
/// Placeholder written for fields without a value
pub const MISSING_FIELD: &str = "-";
/// Header line written to new output files
pub const OUTPUT_HEADER: &str = "# ip\tasn\tcity\tadmin_area\tcountry\tlat\tlon\tmin_rtt\tnearest_facility_city\tunix_timestamp\tiso_datetime";

// HTTP status codes (for clarity and consistency)
/// Too Many Requests, retried with backoff
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
/// Unauthorized, the API key was refused
pub const HTTP_STATUS_UNAUTHORIZED: u16 = 401;
/// Forbidden, the API key lacks the permission
pub const HTTP_STATUS_FORBIDDEN: u16 = 403;
