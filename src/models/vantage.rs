//! Vantage points and the measurements they return.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::net::IpAddr;

/// Identifier of a measurement vantage point (RIPE Atlas probe id).
pub type VantagePointId = u64;

/// RTT samples in milliseconds per vantage point; an empty list means the
/// target was unreachable from that vantage point.
pub type RttObservation = BTreeMap<VantagePointId, Vec<f64>>;

/// Latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl Coordinates {
    /// Creates a coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// `"lat,lon"` key used by the reverse geocoding cache.
    pub fn cache_key(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// A measurement agent at a known position.
///
/// Equality, hashing and ordering only consider the id.
#[derive(Debug, Clone)]
pub struct VantagePoint {
    /// Probe id
    pub id: VantagePointId,
    /// ASN owning the probe's address
    pub asn: u32,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// ISO country code as reported by the platform
    pub country: String,
}

impl VantagePoint {
    /// Position of the vantage point.
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

impl PartialEq for VantagePoint {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for VantagePoint {}

impl Hash for VantagePoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for VantagePoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VantagePoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

/// IP protocol version of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    /// IPv4
    V4,
    /// IPv6
    V6,
}

impl AddressFamily {
    /// Address family of an IP address.
    pub fn from_ip(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => AddressFamily::V4,
            IpAddr::V6(_) => AddressFamily::V6,
        }
    }

    /// Numeric form (4 or 6) used by the measurement API.
    pub fn as_u8(&self) -> u8 {
        match self {
            AddressFamily::V4 => 4,
            AddressFamily::V6 => 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn vp(id: VantagePointId, asn: u32) -> VantagePoint {
        VantagePoint {
            id,
            asn,
            latitude: 0.0,
            longitude: 0.0,
            country: "US".to_string(),
        }
    }

    #[test]
    fn test_vantage_point_identity_is_id() {
        let mut set = HashSet::new();
        set.insert(vp(1, 701));
        set.insert(vp(1, 3356));
        assert_eq!(set.len(), 1);
        assert!(vp(1, 1) < vp(2, 0));
    }

    #[test]
    fn test_address_family() {
        assert_eq!(
            AddressFamily::from_ip(&"8.8.8.8".parse().unwrap()).as_u8(),
            4
        );
        assert_eq!(
            AddressFamily::from_ip(&"2001:db8::1".parse().unwrap()),
            AddressFamily::V6
        );
    }
}
