//! Vantage point selection.
//!
//! Every candidate location is geocoded and resolved to the vantage points
//! within the search radius; each location then contributes at most
//! `probes_per_location` of them (see [`sample_location`]). Vantage points
//! inside the target network do not count against any budget and are always
//! measured from.

mod resolver;
mod sampler;

pub use resolver::{CandidateResolver, ResolvedLocation, VantagePointCache};
pub use sampler::sample_location;

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info, warn};
use rand::Rng;

use crate::atlas::MeasurementPlatform;
use crate::error_handling::CollaboratorError;
use crate::geocode::Geocoder;
use crate::models::{AddressFamily, Coordinates, Location, VantagePoint, VantagePointId};
use crate::relationships::AsRelationships;

/// Per-location budget and fill strategy.
#[derive(Debug, Clone, Copy)]
pub struct SelectionSettings {
    /// Vantage points sampled per candidate location
    pub probes_per_location: usize,
    /// Prefer networks not picked yet during the random fill
    pub diversify_fill: bool,
}

/// Vantage points chosen for one target.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Everything to measure from
    pub vantage_points: BTreeSet<VantagePointId>,
    /// Vantage points within the radius of each resolved location
    pub candidates: BTreeMap<Location, BTreeSet<VantagePointId>>,
    /// Vantage points sampled for each location
    pub per_location: BTreeMap<Location, BTreeSet<VantagePointId>>,
    /// Vantage points inside the target network
    pub own_network: BTreeSet<VantagePointId>,
    /// Coordinates of every resolved location
    pub location_coordinates: BTreeMap<Location, Coordinates>,
    /// Details of every vantage point in `vantage_points`
    pub directory: BTreeMap<VantagePointId, VantagePoint>,
}

impl Selection {
    /// Whether nothing can be measured.
    pub fn is_empty(&self) -> bool {
        self.vantage_points.is_empty()
    }
}

/// Selects the vantage points to measure `target_asn` from.
///
/// Locations are processed in their sorted order, so a fixed `rng` seed
/// reproduces the same selection. Locations that cannot be geocoded or have
/// no vantage point nearby are logged and dropped.
///
/// # Errors
///
/// Only fatal collaborator errors (rejected credentials) are returned.
pub async fn select_vantage_points<G, M, R>(
    resolver: &mut CandidateResolver<'_, G, M>,
    locations: &BTreeSet<Location>,
    target_asn: u32,
    family: AddressFamily,
    relationships: &AsRelationships,
    settings: SelectionSettings,
    rng: &mut R,
) -> Result<Selection, CollaboratorError>
where
    G: Geocoder,
    M: MeasurementPlatform,
    R: Rng + ?Sized,
{
    let mut selection = Selection::default();

    for location in locations {
        let Some(resolved) = resolver.resolve(location, family).await? else {
            continue;
        };
        selection
            .location_coordinates
            .insert(location.clone(), resolved.coordinates);
        if resolved.vantage_points.is_empty() {
            warn!("No vantage points near {}, dropping it", location);
            continue;
        }

        let picked = sample_location(
            &resolved.vantage_points,
            target_asn,
            settings.probes_per_location,
            relationships,
            settings.diversify_fill,
            rng,
        );
        debug!(
            "Selected {} of {} vantage points near {}",
            picked.len(),
            resolved.vantage_points.len(),
            location
        );

        selection.candidates.insert(
            location.clone(),
            resolved.vantage_points.iter().map(|vp| vp.id).collect(),
        );
        selection
            .per_location
            .insert(location.clone(), picked.iter().copied().collect());
        for vp in resolved.vantage_points {
            if picked.contains(&vp.id) {
                selection.vantage_points.insert(vp.id);
                selection.directory.insert(vp.id, vp);
            }
        }
    }

    for vp in resolver.network_vantage_points(target_asn, family).await? {
        selection.own_network.insert(vp.id);
        selection.vantage_points.insert(vp.id);
        selection.directory.insert(vp.id, vp);
    }

    info!(
        "Selected {} vantage points ({} inside AS{}) for {} candidate locations",
        selection.vantage_points.len(),
        selection.own_network.len(),
        target_asn,
        selection.candidates.len()
    );
    Ok(selection)
}
