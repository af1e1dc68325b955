//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error type definitions (initialization, configuration, collaborator failures)
//! - Geolocation outcome categories and their statistics
//! - Retry strategy configuration for HTTP collaborators
//!
//! Only [`ConfigError`] and fatal [`CollaboratorError`]s stop a run; every other
//! failure is logged and the affected source contributes no data.

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_status, get_retry_strategy};
pub use stats::ProcessingStats;
pub use types::{CollaboratorError, ConfigError, InitializationError, OutcomeType};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_processing_stats_initialization() {
        let stats = ProcessingStats::new();
        for outcome in OutcomeType::iter() {
            assert_eq!(stats.get_count(outcome), 0);
        }
    }

    #[test]
    fn test_processing_stats_increment() {
        let stats = ProcessingStats::new();
        stats.increment(OutcomeType::Accepted);
        stats.increment(OutcomeType::Inconclusive);
        stats.increment(OutcomeType::Inconclusive);
        assert_eq!(stats.get_count(OutcomeType::Accepted), 1);
        assert_eq!(stats.get_count(OutcomeType::Inconclusive), 2);
    }

    #[test]
    fn test_processing_stats_totals() {
        let stats = ProcessingStats::new();
        stats.increment(OutcomeType::Accepted);
        stats.increment(OutcomeType::NoPresence);
        stats.increment(OutcomeType::Unreachable);

        assert_eq!(stats.total(), 3);
        assert_eq!(stats.total_rejected(), 2);
    }
}
