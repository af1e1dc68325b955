//! Budgeted vantage point sampling for one candidate location.

use std::collections::{BTreeMap, BTreeSet};

use rand::seq::index;
use rand::Rng;

use crate::models::{VantagePoint, VantagePointId};
use crate::relationships::AsRelationships;

/// Picks at most `budget` vantage points among `candidates`.
///
/// Vantage points owned by `target_asn` are ignored here; they are added to
/// the selection separately. Vantage points of networks adjacent to
/// `target_asn` come first, one per network per round in ascending ASN
/// order. The rest of the budget is filled by uniform sampling without
/// replacement. With `diversify_fill` the fill draws one vantage point at a
/// time among networks not picked yet, and only samples from already picked
/// networks once every network is represented.
///
/// The result only depends on the candidates (not their order) and on the
/// state of `rng`.
pub fn sample_location<R: Rng + ?Sized>(
    candidates: &BTreeSet<VantagePoint>,
    target_asn: u32,
    budget: usize,
    relationships: &AsRelationships,
    diversify_fill: bool,
    rng: &mut R,
) -> Vec<VantagePointId> {
    let mut neighbors: BTreeMap<u32, Vec<&VantagePoint>> = BTreeMap::new();
    let mut others: Vec<&VantagePoint> = Vec::new();
    for vp in candidates.iter().filter(|vp| vp.asn != target_asn) {
        if relationships.are_neighbors(target_asn, vp.asn) {
            neighbors.entry(vp.asn).or_default().push(vp);
        } else {
            others.push(vp);
        }
    }

    let mut selected: Vec<&VantagePoint> = Vec::new();
    while selected.len() < budget {
        let mut picked_this_round = false;
        for members in neighbors.values_mut() {
            if selected.len() >= budget {
                break;
            }
            if members.is_empty() {
                continue;
            }
            let pick = rng.random_range(0..members.len());
            selected.push(members.remove(pick));
            picked_this_round = true;
        }
        if !picked_this_round {
            break;
        }
    }

    let remaining = budget - selected.len();
    if remaining > 0 {
        let mut pool: Vec<&VantagePoint> = neighbors.into_values().flatten().collect();
        pool.extend(others);
        pool.sort_by_key(|vp| vp.id);

        if diversify_fill {
            let mut picked_asns: BTreeSet<u32> = selected.iter().map(|vp| vp.asn).collect();
            while selected.len() < budget && !pool.is_empty() {
                let fresh: Vec<usize> = (0..pool.len())
                    .filter(|&i| !picked_asns.contains(&pool[i].asn))
                    .collect();
                if fresh.is_empty() {
                    let amount = budget - selected.len();
                    selected.extend(sample(&pool, amount, rng));
                    break;
                }
                let vp = pool.remove(fresh[rng.random_range(0..fresh.len())]);
                picked_asns.insert(vp.asn);
                selected.push(vp);
            }
        } else {
            selected.extend(sample(&pool, remaining, rng));
        }
    }

    selected.into_iter().map(|vp| vp.id).collect()
}

/// Uniform sample without replacement; everything when `amount` covers the pool.
fn sample<'a, R: Rng + ?Sized>(
    pool: &[&'a VantagePoint],
    amount: usize,
    rng: &mut R,
) -> Vec<&'a VantagePoint> {
    if amount >= pool.len() {
        return pool.to_vec();
    }
    index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| pool[i])
        .collect()
}
