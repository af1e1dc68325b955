//! Per-target geolocation result.

use std::net::IpAddr;

use chrono::{DateTime, Utc};

use super::location::Location;
use super::vantage::{Coordinates, VantagePointId};
use crate::error_handling::OutcomeType;

/// Location attributed to a target, as reverse-geocoded from the closest
/// vantage point.
#[derive(Debug, Clone, PartialEq)]
pub struct InferredLocation {
    /// Locality of the closest vantage point
    pub city: Option<String>,
    /// Second-level administrative area
    pub admin_area: Option<String>,
    /// Country code
    pub country: Option<String>,
    /// Position of the closest vantage point
    pub coordinates: Coordinates,
}

/// Outcome for one target address, written once to the output.
#[derive(Debug, Clone)]
pub struct GeolocationResult {
    /// Target address
    pub ip: IpAddr,
    /// ASN used for the presence lookup, when known
    pub asn: Option<u32>,
    /// Outcome category
    pub outcome: OutcomeType,
    /// Accepted location; `None` when unresolved
    pub location: Option<InferredLocation>,
    /// Minimum RTT in ms; `None` when nothing was probed, infinite when no
    /// probe answered
    pub min_rtt: Option<f64>,
    /// Vantage point that measured `min_rtt`
    pub closest_vantage_point: Option<VantagePointId>,
    /// Candidate location nearest to the closest vantage point
    pub nearest_facility: Option<Location>,
    /// Time the result was produced
    pub timestamp: DateTime<Utc>,
}

impl GeolocationResult {
    /// Result for a target that was not probed.
    pub fn unresolved(ip: IpAddr, asn: Option<u32>, outcome: OutcomeType) -> Self {
        Self {
            ip,
            asn,
            outcome,
            location: None,
            min_rtt: None,
            closest_vantage_point: None,
            nearest_facility: None,
            timestamp: Utc::now(),
        }
    }

    /// Whether a location was attributed to the target.
    pub fn is_accepted(&self) -> bool {
        self.outcome == OutcomeType::Accepted
    }
}
