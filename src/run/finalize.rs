//! Run finalization.
//!
//! This module contains the `finalize_run` function which logs the outcome
//! statistics and builds the report once every target was processed.

use std::path::Path;
use std::time::Instant;

use crate::app::{log_progress, print_outcome_statistics, print_simple_summary};
use crate::error_handling::ProcessingStats;

use super::GeolocationReport;

/// Finalize a run and produce the report.
///
/// `total_targets` counts every target in the input, including the ones
/// skipped because they were already in the output.
pub fn finalize_run(
    stats: &ProcessingStats,
    total_targets: usize,
    skipped: usize,
    start_time: Instant,
    output: &Path,
) -> GeolocationReport {
    log_progress(start_time, total_targets, total_targets);
    let elapsed_seconds = start_time.elapsed().as_secs_f64();

    print_outcome_statistics(stats);
    let accepted = stats.get_count(crate::error_handling::OutcomeType::Accepted);
    let rejected = stats.total_rejected();
    print_simple_summary(stats.total(), accepted, rejected, elapsed_seconds);

    GeolocationReport {
        total_targets,
        skipped,
        accepted,
        rejected,
        output_path: output.to_path_buf(),
        elapsed_seconds,
    }
}
