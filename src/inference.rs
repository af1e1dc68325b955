//! Reduction of RTT samples to the closest vantage point.

use crate::models::{RttObservation, VantagePointId};

/// Closest vantage point and its minimum RTT.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inference {
    /// Vantage point with the lowest RTT; `None` when nothing answered
    pub vantage_point: Option<VantagePointId>,
    /// Lowest RTT in ms; infinite when nothing answered
    pub min_rtt: f64,
}

impl Inference {
    /// Whether the target is close enough to the vantage point to adopt
    /// its location.
    pub fn is_accepted(&self, threshold_ms: f64) -> bool {
        self.vantage_point.is_some() && self.min_rtt < threshold_ms
    }

    /// Whether any vantage point answered.
    pub fn is_reachable(&self) -> bool {
        self.vantage_point.is_some()
    }
}

/// Global minimum over the per-vantage-point minimum RTTs.
///
/// Non-finite samples are ignored. On ties the lowest id wins.
pub fn infer(observations: &RttObservation) -> Inference {
    let mut best = Inference {
        vantage_point: None,
        min_rtt: f64::INFINITY,
    };
    // ascending ids, so a strict comparison keeps the lowest id on ties
    for (id, samples) in observations {
        let Some(min) = samples
            .iter()
            .copied()
            .filter(|rtt| rtt.is_finite())
            .reduce(f64::min)
        else {
            continue;
        };
        if min < best.min_rtt {
            best = Inference {
                vantage_point: Some(*id),
                min_rtt: min,
            };
        }
    }
    best
}
