//! Candidate location to nearby vantage points, memoized for the whole run.

use std::collections::{BTreeSet, HashMap, HashSet};

use log::{debug, warn};

use crate::atlas::{MeasurementPlatform, VantagePointFilter};
use crate::distance::distance_km;
use crate::error_handling::CollaboratorError;
use crate::geocode::{forward_cached, GeocodeCache, Geocoder};
use crate::models::{AddressFamily, Coordinates, Location, VantagePoint};

/// Vantage points nearby a resolved location.
#[derive(Debug, Clone)]
pub struct ResolvedLocation {
    /// Position of the location
    pub coordinates: Coordinates,
    /// Vantage points within the search radius
    pub vantage_points: BTreeSet<VantagePoint>,
}

/// Run-scoped memo of vantage point lookups.
///
/// Grows monotonically; nothing is evicted.
#[derive(Debug, Default)]
pub struct VantagePointCache {
    locations: HashMap<(Location, AddressFamily), ResolvedLocation>,
    countries: HashMap<(String, AddressFamily), BTreeSet<VantagePoint>>,
    networks: HashMap<(u32, AddressFamily), BTreeSet<VantagePoint>>,
    unresolvable: HashSet<Location>,
}

impl VantagePointCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Resolves locations and networks to vantage points through the caches.
pub struct CandidateResolver<'a, G, M> {
    /// Forward geocoder
    pub geocoder: &'a G,
    /// Measurement platform listing vantage points
    pub platform: &'a M,
    /// Persistent geocoding cache
    pub geocode_cache: &'a mut GeocodeCache,
    /// Run-scoped vantage point cache
    pub cache: &'a mut VantagePointCache,
    /// Search radius around a location in km
    pub radius_km: f64,
}

impl<G: Geocoder, M: MeasurementPlatform> CandidateResolver<'_, G, M> {
    /// Vantage points within the radius of `location`.
    ///
    /// Returns `Ok(None)` when the location cannot be geocoded. Only fatal
    /// collaborator errors are returned; the others are logged and leave the
    /// location unresolved (geocoding) or without vantage points (listing).
    pub async fn resolve(
        &mut self,
        location: &Location,
        family: AddressFamily,
    ) -> Result<Option<ResolvedLocation>, CollaboratorError> {
        let key = (location.clone(), family);
        if let Some(resolved) = self.cache.locations.get(&key) {
            return Ok(Some(resolved.clone()));
        }
        if self.cache.unresolvable.contains(location) {
            return Ok(None);
        }

        let geocoded = match forward_cached(self.geocoder, &mut *self.geocode_cache, location).await {
            Ok(Some(geocoded)) => geocoded,
            Ok(None) => {
                warn!("Could not geocode {}, skipping it", location);
                self.cache.unresolvable.insert(location.clone());
                return Ok(None);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("Geocoding {} failed: {}", location, e);
                return Ok(None);
            }
        };

        let in_country = self.country_vantage_points(&geocoded.country, family).await?;
        let vantage_points: BTreeSet<VantagePoint> = in_country
            .into_iter()
            .filter(|vp| distance_km(geocoded.coordinates, vp.coordinates()) <= self.radius_km)
            .collect();
        debug!(
            "{} vantage points within {} km of {}",
            vantage_points.len(),
            self.radius_km,
            location
        );

        let resolved = ResolvedLocation {
            coordinates: geocoded.coordinates,
            vantage_points,
        };
        // a failed country listing is retried for the next target
        let listed = self
            .cache
            .countries
            .contains_key(&(geocoded.country.to_uppercase(), family));
        if listed {
            self.cache.locations.insert(key, resolved.clone());
        }
        Ok(Some(resolved))
    }

    /// Vantage points inside the network `asn`.
    pub async fn network_vantage_points(
        &mut self,
        asn: u32,
        family: AddressFamily,
    ) -> Result<BTreeSet<VantagePoint>, CollaboratorError> {
        if let Some(found) = self.cache.networks.get(&(asn, family)) {
            return Ok(found.clone());
        }
        match self.list(&VantagePointFilter::Asn(asn), family).await? {
            Some(found) => {
                self.cache.networks.insert((asn, family), found.clone());
                Ok(found)
            }
            None => Ok(BTreeSet::new()),
        }
    }

    async fn country_vantage_points(
        &mut self,
        country: &str,
        family: AddressFamily,
    ) -> Result<BTreeSet<VantagePoint>, CollaboratorError> {
        let key = (country.to_uppercase(), family);
        if let Some(found) = self.cache.countries.get(&key) {
            return Ok(found.clone());
        }
        let filter = VantagePointFilter::Country(key.0.clone());
        match self.list(&filter, family).await? {
            Some(found) => {
                self.cache.countries.insert(key, found.clone());
                Ok(found)
            }
            None => Ok(BTreeSet::new()),
        }
    }

    /// `Ok(None)` on non-fatal failures, which are not memoized.
    async fn list(
        &self,
        filter: &VantagePointFilter,
        family: AddressFamily,
    ) -> Result<Option<BTreeSet<VantagePoint>>, CollaboratorError> {
        match self.platform.active_vantage_points(filter, family).await {
            Ok(found) => Ok(Some(found)),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!("Listing vantage points for {} failed: {}", filter, e);
                Ok(None)
            }
        }
    }
}
