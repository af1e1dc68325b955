//! Great-circle distance.

use crate::models::Coordinates;

/// Mean Earth radius in kilometers (IUGG)
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Haversine distance between two points in kilometers.
///
/// Coordinates are not validated; out-of-range values produce a number but
/// not a meaningful one.
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // clamp against rounding pushing h slightly above 1 for antipodes
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}
