//! Statistics printing.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{OutcomeType, ProcessingStats};

/// Prints the number of targets per outcome to the log.
pub fn print_outcome_statistics(stats: &ProcessingStats) {
    let total = stats.total();
    if total == 0 {
        return;
    }
    info!("Outcome Counts ({} total):", total);
    for outcome in OutcomeType::iter() {
        let count = stats.get_count(outcome);
        if count > 0 {
            info!("   {}: {}", outcome.as_str(), count);
        }
    }
}

/// Prints a one-line summary of the run.
pub fn print_simple_summary(total: usize, accepted: usize, rejected: usize, elapsed_seconds: f64) {
    info!(
        "✅ Geolocated {} of {} target{} ({} unresolved) in {:.1}s",
        accepted,
        total,
        if total == 1 { "" } else { "s" },
        rejected,
        elapsed_seconds
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_outcome_statistics_empty() {
        let stats = ProcessingStats::new();
        // Should not panic when nothing was processed
        print_outcome_statistics(&stats);
    }

    #[test]
    fn test_print_outcome_statistics_all_types() {
        let stats = ProcessingStats::new();
        for outcome in OutcomeType::iter() {
            stats.increment(outcome);
        }
        print_outcome_statistics(&stats);
        assert_eq!(stats.total(), 6);
    }
}
