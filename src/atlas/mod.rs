//! RIPE Atlas measurement platform.
//!
//! Vantage points are Atlas probes. A ping is one one-off measurement over a
//! list of probes; its results are collected once the measurement stops or
//! after a fixed number of status checks, whichever comes first.

mod client;
mod types;

pub use client::AtlasClient;

use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;

use crate::error_handling::CollaboratorError;
use crate::models::{AddressFamily, RttObservation, VantagePoint, VantagePointId};

/// Which connected probes to list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VantagePointFilter {
    /// Probes in a country (ISO code)
    Country(String),
    /// Probes whose address belongs to an ASN
    Asn(u32),
}

impl fmt::Display for VantagePointFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VantagePointFilter::Country(code) => write!(f, "country {}", code),
            VantagePointFilter::Asn(asn) => write!(f, "AS{}", asn),
        }
    }
}

/// One ping measurement over a batch of vantage points.
#[derive(Debug, Clone)]
pub struct PingRequest {
    /// Address to ping
    pub target: IpAddr,
    /// Measurement description
    pub description: String,
    /// Packets per vantage point
    pub packets: u32,
    /// Vantage points taking part
    pub vantage_points: Vec<VantagePointId>,
}

impl PingRequest {
    /// Address family of the target.
    pub fn address_family(&self) -> AddressFamily {
        AddressFamily::from_ip(&self.target)
    }
}

/// Platform running latency measurements from vantage points.
#[allow(async_fn_in_trait)]
pub trait MeasurementPlatform {
    /// Connected vantage points matching `filter` that can measure `family`.
    async fn active_vantage_points(
        &self,
        filter: &VantagePointFilter,
        family: AddressFamily,
    ) -> Result<BTreeSet<VantagePoint>, CollaboratorError>;

    /// Runs a ping and waits for its results.
    ///
    /// Vantage points that returned no RTT may be missing from the result or
    /// map to an empty list.
    async fn ping(&self, request: &PingRequest) -> Result<RttObservation, CollaboratorError>;
}
