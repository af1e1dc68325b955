//! Forward and reverse geocoding with persistent caches.
//!
//! Forward geocoding turns a candidate location into coordinates; reverse
//! geocoding names the place of the vantage point that ends up closest to a
//! target. Both go through a [`GeocodeCache`] first, and every answer from
//! the geocoder is appended to it.

mod cache;
mod google;

pub use cache::GeocodeCache;
pub use google::GoogleGeocoder;

use log::debug;

use crate::error_handling::CollaboratorError;
use crate::models::{Coordinates, Location};

/// Position and canonical naming of a location.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardGeocode {
    /// Position of the city
    pub coordinates: Coordinates,
    /// City name as returned by the geocoder
    pub city: String,
    /// Country code as returned by the geocoder
    pub country: String,
}

/// Place names at a position; any part may be unknown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReverseGeocode {
    /// Locality (city)
    pub locality: Option<String>,
    /// Second-level administrative area
    pub admin_area: Option<String>,
    /// Country code
    pub country: Option<String>,
}

/// Name to coordinates and coordinates to name resolution.
#[allow(async_fn_in_trait)]
pub trait Geocoder {
    /// Coordinates of a location; `Ok(None)` when the geocoder knows no
    /// complete answer.
    async fn forward(&self, location: &Location) -> Result<Option<ForwardGeocode>, CollaboratorError>;

    /// Place names at a position; `Ok(None)` when nothing is known there.
    async fn reverse(
        &self,
        coordinates: Coordinates,
    ) -> Result<Option<ReverseGeocode>, CollaboratorError>;
}

/// Forward geocoding through the cache.
pub async fn forward_cached<G: Geocoder>(
    geocoder: &G,
    cache: &mut GeocodeCache,
    location: &Location,
) -> Result<Option<ForwardGeocode>, CollaboratorError> {
    if let Some(hit) = cache.forward(location) {
        debug!("Forward geocoding cache hit for {}", location);
        return Ok(Some(hit.clone()));
    }
    let answer = geocoder.forward(location).await?;
    if let Some(found) = &answer {
        cache.insert_forward(location, found.clone());
    }
    Ok(answer)
}

/// Reverse geocoding through the cache.
pub async fn reverse_cached<G: Geocoder>(
    geocoder: &G,
    cache: &mut GeocodeCache,
    coordinates: Coordinates,
) -> Result<Option<ReverseGeocode>, CollaboratorError> {
    if let Some(hit) = cache.reverse(coordinates) {
        debug!("Reverse geocoding cache hit for {}", coordinates.cache_key());
        return Ok(Some(hit.clone()));
    }
    let answer = geocoder.reverse(coordinates).await?;
    if let Some(found) = &answer {
        cache.insert_reverse(coordinates, found.clone());
    }
    Ok(answer)
}
