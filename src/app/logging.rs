//! Progress logging utilities.

use log::info;

/// Logs progress information about target processing.
///
/// # Arguments
///
/// * `start_time` - The start time of processing
/// * `completed` - Number of targets processed so far
/// * `total` - Number of targets in the input
pub fn log_progress(start_time: std::time::Instant, completed: usize, total: usize) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let rate = if elapsed_secs > 0.0 {
        completed as f64 * 60.0 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Processed {}/{} targets in {:.2} seconds (~{:.2} targets/min)",
        completed, total, elapsed_secs, rate
    );
}
