//! Per-target geolocation: aggregate, select, probe, infer.

use std::collections::HashMap;
use std::net::IpAddr;

use chrono::Utc;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::targets::Target;
use crate::atlas::MeasurementPlatform;
use crate::config::{Config, MEASUREMENT_DESCRIPTION};
use crate::distance::distance_km;
use crate::error_handling::{CollaboratorError, OutcomeType};
use crate::geocode::{reverse_cached, GeocodeCache, Geocoder};
use crate::geoip::IpLocator;
use crate::inference::infer;
use crate::models::{
    AddressFamily, Coordinates, GeolocationResult, InferredLocation, Location, VantagePoint,
};
use crate::peeringdb::PresenceSource;
use crate::presence::{aggregate, PresenceOverrides};
use crate::probing::{probe, ProbeParams};
use crate::relationships::AsRelationships;
use crate::selection::{
    select_vantage_points, CandidateResolver, Selection, SelectionSettings, VantagePointCache,
};

/// External services the pipeline talks to.
pub struct Collaborators<P, L, G, M> {
    /// Facility and exchange presence (PeeringDB)
    pub presence: P,
    /// Address to location and ASN (GeoIP)
    pub locator: L,
    /// Forward and reverse geocoding
    pub geocoder: G,
    /// Vantage point listing and pings (RIPE Atlas)
    pub platform: M,
}

/// Tunables of a run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Per-location budget and fill strategy
    pub selection: SelectionSettings,
    /// Measurement parameters
    pub probe: ProbeParams,
    /// Search radius around a candidate location in km
    pub radius_km: f64,
    /// Acceptance threshold in ms
    pub accept_threshold_ms: f64,
    /// Use the exchange fabric ASN for IXP LAN addresses
    pub substitute_fabric_asn: bool,
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            selection: SelectionSettings {
                probes_per_location: config.probes_per_location,
                diversify_fill: config.diversify_fill,
            },
            probe: ProbeParams {
                packets: config.packets,
                chunk_size: config.chunk_size,
                short_circuit_ms: config.short_circuit_ms,
                description: MEASUREMENT_DESCRIPTION.to_string(),
            },
            radius_km: config.radius_km,
            accept_threshold_ms: config.accept_threshold_ms,
            substitute_fabric_asn: config.substitute_fabric_asn,
        }
    }
}

/// Geolocates targets one after the other, keeping caches across targets.
pub struct GeolocationPipeline<P, L, G, M> {
    collaborators: Collaborators<P, L, G, M>,
    overrides: PresenceOverrides,
    relationships: AsRelationships,
    geocode_cache: GeocodeCache,
    vantage_cache: VantagePointCache,
    settings: PipelineSettings,
    geoip_hints: HashMap<IpAddr, Option<Location>>,
    rng: StdRng,
}

impl<P, L, G, M> GeolocationPipeline<P, L, G, M>
where
    P: PresenceSource,
    L: IpLocator,
    G: Geocoder,
    M: MeasurementPlatform,
{
    /// Creates a pipeline; sampling is reproducible when `seed` is given.
    pub fn new(
        collaborators: Collaborators<P, L, G, M>,
        overrides: PresenceOverrides,
        relationships: AsRelationships,
        geocode_cache: GeocodeCache,
        settings: PipelineSettings,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            collaborators,
            overrides,
            relationships,
            geocode_cache,
            vantage_cache: VantagePointCache::new(),
            settings,
            geoip_hints: HashMap::new(),
            rng,
        }
    }

    /// Looks up the GeoIP locations of `ips` in one pass, ahead of
    /// [`geolocate`](Self::geolocate).
    pub fn prefetch_geoip(&mut self, ips: &[IpAddr]) {
        let found = self.collaborators.locator.lookup_ips(ips);
        debug!("GeoIP knows {} of {} targets", found.len(), ips.len());
        self.geoip_hints.extend(ips.iter().map(|ip| (*ip, None)));
        self.geoip_hints
            .extend(found.into_iter().map(|(ip, location)| (ip, Some(location))));
    }

    /// Geolocates one target.
    ///
    /// Every outcome other than a fatal collaborator error produces a result,
    /// including targets that could not be probed.
    ///
    /// # Errors
    ///
    /// Returns the collaborator error when a service rejected our credentials.
    pub async fn geolocate(&mut self, target: &Target) -> Result<GeolocationResult, CollaboratorError> {
        let ip = target.ip;
        let Some(asn) = target
            .asn
            .or_else(|| self.collaborators.locator.lookup_asn(ip))
        else {
            warn!("Could not determine the ASN of {}, skipping it", ip);
            return Ok(GeolocationResult::unresolved(ip, None, OutcomeType::UnknownAsn));
        };
        let family = AddressFamily::from_ip(&ip);

        let geoip = match self.geoip_hints.remove(&ip) {
            Some(hint) => hint,
            None => self.collaborators.locator.lookup_ip(ip),
        };
        let aggregation = aggregate(
            &self.collaborators.presence,
            geoip,
            &self.overrides,
            ip,
            asn,
            self.settings.substitute_fabric_asn,
        )
        .await;
        let asn = aggregation.asn;
        if aggregation.locations.is_empty() {
            warn!("No presence data for {} (AS{})", ip, asn);
            return Ok(GeolocationResult::unresolved(ip, Some(asn), OutcomeType::NoPresence));
        }

        let mut resolver = CandidateResolver {
            geocoder: &self.collaborators.geocoder,
            platform: &self.collaborators.platform,
            geocode_cache: &mut self.geocode_cache,
            cache: &mut self.vantage_cache,
            radius_km: self.settings.radius_km,
        };
        let selection = select_vantage_points(
            &mut resolver,
            &aggregation.locations,
            asn,
            family,
            &self.relationships,
            self.settings.selection,
            &mut self.rng,
        )
        .await?;
        if selection.is_empty() {
            warn!("No vantage points near any candidate location of {}", ip);
            return Ok(GeolocationResult::unresolved(
                ip,
                Some(asn),
                OutcomeType::NoVantagePoints,
            ));
        }

        let probed = probe(
            &self.collaborators.platform,
            &selection.vantage_points,
            ip,
            &self.settings.probe,
        )
        .await?;
        let inference = infer(&probed.observations);

        let mut result = GeolocationResult::unresolved(ip, Some(asn), OutcomeType::Unreachable);
        result.min_rtt = Some(inference.min_rtt);
        result.closest_vantage_point = inference.vantage_point;
        let Some(closest) = inference
            .vantage_point
            .and_then(|id| selection.directory.get(&id))
        else {
            warn!("None of the {} vantage points reached {}", selection.vantage_points.len(), ip);
            return Ok(result);
        };

        if !inference.is_accepted(self.settings.accept_threshold_ms) {
            info!(
                "{}: minimum RTT {} ms from probe {} is not below {} ms",
                ip, inference.min_rtt, closest.id, self.settings.accept_threshold_ms
            );
            result.outcome = OutcomeType::Inconclusive;
            return Ok(result);
        }

        let coordinates = closest.coordinates();
        let names = match reverse_cached(
            &self.collaborators.geocoder,
            &mut self.geocode_cache,
            coordinates,
        )
        .await
        {
            Ok(names) => names.unwrap_or_default(),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("Reverse geocoding {} failed: {}", coordinates.cache_key(), e);
                Default::default()
            }
        };

        result.outcome = OutcomeType::Accepted;
        result.location = Some(InferredLocation {
            city: names.locality,
            admin_area: names.admin_area,
            country: names.country.or_else(|| Some(closest.country.clone())),
            coordinates,
        });
        result.nearest_facility = nearest_location(&selection, closest);
        result.timestamp = Utc::now();
        info!(
            "{} located near probe {} ({}) with {} ms",
            ip,
            closest.id,
            coordinates.cache_key(),
            inference.min_rtt
        );
        Ok(result)
    }
}

/// Candidate location closest to `vantage_point`; the first one in sorted
/// order wins ties.
fn nearest_location(selection: &Selection, vantage_point: &VantagePoint) -> Option<Location> {
    let origin: Coordinates = vantage_point.coordinates();
    let mut best: Option<(&Location, f64)> = None;
    for (location, coordinates) in &selection.location_coordinates {
        let distance = distance_km(origin, *coordinates);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((location, distance));
        }
    }
    best.map(|(location, _)| location.clone())
}
