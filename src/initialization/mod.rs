//! Application initialization.
//!
//! This module provides functions to initialize the shared resources that do
//! not depend on the targets:
//! - Logger (plain or JSON)
//! - HTTP client
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;
