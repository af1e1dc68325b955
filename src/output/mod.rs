//! Geolocation result output.
//!
//! Results are appended to a tab-separated file, one line per target. The
//! first column of that file is read back on the next run to skip targets
//! that were already processed.

mod processed;
mod recorder;

pub use processed::{ensure_output_writable, read_processed_ips};
pub use recorder::{format_record, record, ResultRecorder};
