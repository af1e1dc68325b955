//! Processing statistics tracking.
//!
//! This module counts geolocation outcomes per target address.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::OutcomeType;

/// Processing statistics tracker.
///
/// Tracks one counter per [`OutcomeType`] using atomic counters, so a shared
/// reference is enough to record outcomes. All types are initialized to zero
/// on creation.
pub struct ProcessingStats {
    outcomes: HashMap<OutcomeType, AtomicUsize>,
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStats {
    /// Creates a tracker with every outcome counter at zero.
    pub fn new() -> Self {
        let mut outcomes = HashMap::new();
        for outcome in OutcomeType::iter() {
            outcomes.insert(outcome, AtomicUsize::new(0));
        }
        ProcessingStats { outcomes }
    }

    /// Increment an outcome counter.
    pub fn increment(&self, outcome: OutcomeType) {
        if let Some(counter) = self.outcomes.get(&outcome) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment outcome counter for {:?} which is not in the map. \
                 This indicates a bug in ProcessingStats initialization.",
                outcome
            );
        }
    }

    /// Get the count for an outcome type.
    pub fn get_count(&self, outcome: OutcomeType) -> usize {
        self.outcomes
            .get(&outcome)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Total number of recorded outcomes.
    pub fn total(&self) -> usize {
        OutcomeType::iter().map(|o| self.get_count(o)).sum()
    }

    /// Number of outcomes other than [`OutcomeType::Accepted`].
    pub fn total_rejected(&self) -> usize {
        self.total() - self.get_count(OutcomeType::Accepted)
    }
}
