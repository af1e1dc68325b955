//! GeoIP lookups using MaxMind GeoLite2 databases.
//!
//! The City database gives the location hint for a target address and the
//! ASN database maps targets without an explicit ASN to their network. When
//! the City database only knows the country, the most populous city of that
//! country (from the world cities file) is used instead.

mod database;
mod gazetteer;

pub use database::GeoIpDatabase;
pub use gazetteer::Gazetteer;

use std::net::IpAddr;

use crate::models::Location;

/// Address to location and ASN mapping.
pub trait IpLocator {
    /// City-level location of `ip`, if known.
    fn lookup_ip(&self, ip: IpAddr) -> Option<Location>;

    /// ASN announcing `ip`, if known.
    fn lookup_asn(&self, ip: IpAddr) -> Option<u32>;

    /// Locations of several addresses, skipping unknown ones.
    fn lookup_ips(&self, ips: &[IpAddr]) -> Vec<(IpAddr, Location)> {
        ips.iter()
            .filter_map(|ip| self.lookup_ip(*ip).map(|location| (*ip, location)))
            .collect()
    }
}
