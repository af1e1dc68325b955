//! Candidate locations of a target network.
//!
//! Presence hints come from PeeringDB, the GeoIP location of the target
//! address and a manually curated presence file.

mod aggregator;
mod overrides;

pub use aggregator::{aggregate, Aggregation};
pub use overrides::{load_presence_overrides, parse_presence_overrides, PresenceOverrides};
