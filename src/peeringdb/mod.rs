//! PeeringDB presence lookups.
//!
//! An ASN's presence is the union of the cities of its facilities
//! (`netfac`) and, for every exchange it is connected to (`netixlan`), the
//! exchange's own city plus the cities of the exchange's facilities.

mod client;
mod types;

pub use client::PeeringDbClient;

use std::collections::BTreeSet;
use std::net::IpAddr;

use crate::models::Location;

/// Source of city-level presence for networks.
///
/// Implementations log their own failures and return empty results.
#[allow(async_fn_in_trait)]
pub trait PresenceSource {
    /// Cities where `asn` has facilities or exchange connections.
    async fn asn_locations(&self, asn: u32) -> BTreeSet<Location>;

    /// ASN registered for `ip` on an exchange fabric, if `ip` is one.
    async fn exchange_fabric_asn(&self, ip: IpAddr) -> Option<u32>;
}
