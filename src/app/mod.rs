//! Main application modules.
//!
//! This module provides progress logging and statistics printing used by the
//! run driver.

pub mod logging;
pub mod statistics;

// Re-export public API
pub use logging::log_progress;
pub use statistics::{print_outcome_statistics, print_simple_summary};
