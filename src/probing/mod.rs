//! Batched latency probing with early exit.

use std::collections::BTreeSet;
use std::net::IpAddr;

use log::{debug, info, warn};

use crate::atlas::{MeasurementPlatform, PingRequest};
use crate::error_handling::CollaboratorError;
use crate::models::{RttObservation, VantagePointId};

/// Measurement parameters shared by every batch.
#[derive(Debug, Clone)]
pub struct ProbeParams {
    /// Packets per vantage point
    pub packets: u32,
    /// Vantage points per measurement
    pub chunk_size: usize,
    /// Stop once the running minimum RTT drops below this value (ms)
    pub short_circuit_ms: f64,
    /// Measurement description
    pub description: String,
}

/// RTTs collected for one target.
#[derive(Debug, Clone, Default)]
pub struct ProbeOutcome {
    /// Samples per vantage point; every probed vantage point has an entry
    pub observations: RttObservation,
    /// Measurements issued
    pub batches_issued: usize,
    /// Whether probing stopped before the last batch
    pub short_circuited: bool,
}

/// Splits ids into consecutive ascending chunks of at most `chunk_size`.
///
/// A `chunk_size` of zero is treated as one.
pub fn partition_batches(
    vantage_points: &BTreeSet<VantagePointId>,
    chunk_size: usize,
) -> Vec<Vec<VantagePointId>> {
    let ids: Vec<VantagePointId> = vantage_points.iter().copied().collect();
    ids.chunks(chunk_size.max(1)).map(<[_]>::to_vec).collect()
}

/// Pings `target` from `vantage_points`, one measurement per batch.
///
/// Batches run one after the other; after each one the minimum RTT seen so
/// far is compared with `short_circuit_ms` and the remaining batches are
/// skipped once it is strictly lower. Vantage points without a reply map to
/// an empty list. A failed batch is logged and contributes nothing.
///
/// # Errors
///
/// Only fatal collaborator errors are returned.
pub async fn probe<M: MeasurementPlatform>(
    platform: &M,
    vantage_points: &BTreeSet<VantagePointId>,
    target: IpAddr,
    params: &ProbeParams,
) -> Result<ProbeOutcome, CollaboratorError> {
    let batches = partition_batches(vantage_points, params.chunk_size);
    let total_batches = batches.len();
    let mut outcome = ProbeOutcome::default();
    let mut running_min = f64::INFINITY;

    for (index, batch) in batches.into_iter().enumerate() {
        let request = PingRequest {
            target,
            description: params.description.clone(),
            packets: params.packets,
            vantage_points: batch,
        };
        outcome.batches_issued += 1;
        match platform.ping(&request).await {
            Ok(observations) => {
                for (id, samples) in observations {
                    if vantage_points.contains(&id) {
                        outcome.observations.entry(id).or_default().extend(samples);
                    }
                }
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => warn!(
                "Batch {}/{} towards {} failed: {}",
                index + 1,
                total_batches,
                target,
                e
            ),
        }
        for id in &request.vantage_points {
            outcome.observations.entry(*id).or_default();
        }

        running_min = outcome
            .observations
            .values()
            .flatten()
            .copied()
            .filter(|rtt| rtt.is_finite())
            .fold(running_min, f64::min);
        debug!(
            "Batch {}/{} towards {}: running minimum {} ms",
            index + 1,
            total_batches,
            target,
            running_min
        );
        if running_min < params.short_circuit_ms && index + 1 < total_batches {
            info!(
                "RTT {} ms below {} ms towards {}, skipping {} remaining batches",
                running_min,
                params.short_circuit_ms,
                target,
                total_batches - index - 1
            );
            outcome.short_circuited = true;
            break;
        }
    }

    Ok(outcome)
}
