//! PeeringDB response bodies (only the fields used).

use serde::Deserialize;

/// Every PeeringDB endpoint wraps its objects in `data`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: Vec<T>,
}

/// Network connection to an exchange LAN.
#[derive(Debug, Deserialize)]
pub(crate) struct NetIxLan {
    pub ix_id: u64,
    #[serde(default)]
    pub asn: Option<u32>,
}

/// Network presence in a facility.
#[derive(Debug, Deserialize)]
pub(crate) struct NetFac {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

/// Exchange with its facilities (`depth=2`).
#[derive(Debug, Deserialize)]
pub(crate) struct Ix {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub fac_set: Vec<Facility>,
}

/// Facility as embedded in `fac_set`.
#[derive(Debug, Deserialize)]
pub(crate) struct Facility {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}
