//! Merging of presence hints into candidate locations.

use std::collections::BTreeSet;
use std::net::IpAddr;

use log::{debug, info};

use super::PresenceOverrides;
use crate::models::Location;
use crate::peeringdb::PresenceSource;

/// Candidate locations for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    /// ASN the lookups were made for; differs from the routing ASN when the
    /// target is an exchange fabric address
    pub asn: u32,
    /// Deduplicated candidate locations, possibly empty
    pub locations: BTreeSet<Location>,
}

/// Collects the candidate locations of `ip`, announced by `asn`, adding the
/// GeoIP location of `ip` when one is known.
///
/// With `substitute_fabric` the ASN registered for `ip` on an exchange LAN
/// replaces `asn` before any lookup. Sources that fail contribute nothing, so
/// an empty set only means that no source knows the network.
pub async fn aggregate<P>(
    presence: &P,
    geoip: Option<Location>,
    overrides: &PresenceOverrides,
    ip: IpAddr,
    asn: u32,
    substitute_fabric: bool,
) -> Aggregation
where
    P: PresenceSource,
{
    let mut asn = asn;
    if substitute_fabric {
        if let Some(member) = presence.exchange_fabric_asn(ip).await {
            if member != asn {
                info!(
                    "{} is an exchange fabric address of AS{}, using it instead of AS{}",
                    ip, member, asn
                );
                asn = member;
            }
        }
    }

    let mut locations = presence.asn_locations(asn).await;
    debug!("PeeringDB lists {} locations for AS{}", locations.len(), asn);

    if let Some(location) = geoip {
        debug!("GeoIP places {} in {}", ip, location);
        locations.insert(location);
    }
    locations.extend(overrides.locations(asn).cloned());

    info!(
        "{} candidate locations for {} (AS{})",
        locations.len(),
        ip,
        asn
    );
    Aggregation { asn, locations }
}
