//! Run resource initialization.
//!
//! This module contains the `init_pipeline` function which loads every input
//! named by the configuration and connects the collaborators before the first
//! target is processed.

use anyhow::{Context, Result};
use log::{info, warn};

use crate::atlas::AtlasClient;
use crate::config::{Config, ATLAS_API_KEY_ENV, GOOGLE_MAPS_API_KEY_ENV};
use crate::error_handling::ConfigError;
use crate::geocode::{GeocodeCache, GoogleGeocoder};
use crate::geoip::GeoIpDatabase;
use crate::initialization::init_client;
use crate::output::ensure_output_writable;
use crate::peeringdb::PeeringDbClient;
use crate::presence::{load_presence_overrides, PresenceOverrides};
use crate::relationships::{load_relationships, AsRelationships};

use super::pipeline::{Collaborators, GeolocationPipeline, PipelineSettings};
use super::targets::{read_targets, Target};

/// Pipeline wired to the production services.
pub type DefaultPipeline =
    GeolocationPipeline<PeeringDbClient, GeoIpDatabase, GoogleGeocoder, AtlasClient>;

/// Initialize everything needed for a run.
///
/// This function performs the following steps:
/// 1. Check the API keys
/// 2. Read the targets
/// 3. Check that the output location is writable
/// 4. Load AS relationships, presence file and GeoIP databases
/// 5. Open the geocoding caches
/// 6. Build the HTTP client and the service clients
///
/// # Errors
///
/// Every failure here is fatal: missing or unreadable inputs, missing API
/// keys, no valid target, unwritable output, or HTTP client setup failure.
pub fn init_pipeline(config: &Config) -> Result<(DefaultPipeline, Vec<Target>)> {
    let atlas_key = config
        .atlas_api_key
        .clone()
        .ok_or(ConfigError::MissingApiKey(ATLAS_API_KEY_ENV))?;
    let google_key = config
        .google_maps_api_key
        .clone()
        .ok_or(ConfigError::MissingApiKey(GOOGLE_MAPS_API_KEY_ENV))?;

    let targets = read_targets(
        config.target_ip.as_deref(),
        config.target_asn,
        config.target_file.as_deref(),
    )?;
    ensure_output_writable(&config.output)?;

    let relationships = match &config.relations {
        Some(path) => load_relationships(path)?,
        None => {
            warn!("No AS relationships file given, neighboring networks will not be preferred");
            AsRelationships::new()
        }
    };
    let overrides = match &config.presence {
        Some(path) => load_presence_overrides(path)?,
        None => PresenceOverrides::new(),
    };
    let geoip = GeoIpDatabase::open(
        config.geoip_city.as_deref(),
        config.geoip_asn.as_deref(),
        config.world_cities.as_deref(),
    )?;
    if !geoip.has_asn_database() && targets.iter().any(|t| t.asn.is_none()) {
        warn!("No GeoIP ASN database given, targets without an explicit ASN will be skipped");
    }
    let geocode_cache = GeocodeCache::open(&config.cache_dir)?;

    let client = init_client(config.timeout_seconds).context("Failed to initialize HTTP client")?;
    let collaborators = Collaborators {
        presence: PeeringDbClient::new(client.clone()),
        locator: geoip,
        geocoder: GoogleGeocoder::new(client.clone(), google_key),
        platform: AtlasClient::new(client, atlas_key)
            .with_polling(config.poll_interval, config.max_polls),
    };

    let settings = PipelineSettings::from(config);
    info!(
        "Selecting {} probes per location within {} km, accepting RTTs below {} ms",
        settings.selection.probes_per_location, settings.radius_km, settings.accept_threshold_ms
    );
    let pipeline = GeolocationPipeline::new(
        collaborators,
        overrides,
        relationships,
        geocode_cache,
        settings,
        config.seed,
    );
    Ok((pipeline, targets))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_atlas_key_is_fatal() {
        let config = Config {
            target_ip: Some("8.8.8.8".to_string()),
            google_maps_api_key: Some("g".to_string()),
            ..Default::default()
        };
        let err = init_pipeline(&config).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingApiKey(ATLAS_API_KEY_ENV))
        ));
    }

    #[test]
    fn test_missing_relationships_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            target_ip: Some("8.8.8.8".to_string()),
            atlas_api_key: Some("a".to_string()),
            google_maps_api_key: Some("g".to_string()),
            relations: Some(dir.path().join("missing.as-rel2.txt")),
            output: dir.path().join("out.tsv"),
            cache_dir: dir.path().join("cache"),
            ..Default::default()
        };
        let err = init_pipeline(&config).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingFile { flag: "-r/--relations", .. })
        ));
    }
}
