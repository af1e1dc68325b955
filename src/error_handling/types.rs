//! Error type definitions.
//!
//! This module defines the error types and geolocation outcome categories used
//! throughout the application.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Fatal configuration problems.
///
/// These are the only errors that stop a run: continuing without the
/// referenced input would produce meaningless results.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A file named on the command line does not exist.
    #[error("The file `{}` provided by {flag} does not exist", path.display())]
    MissingFile {
        /// Command-line flag that named the file
        flag: &'static str,
        /// Path as given
        path: PathBuf,
    },

    /// A file exists but could not be read.
    #[error("Failed to read `{}`: {source}", path.display())]
    Unreadable {
        /// Path of the file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A required API key is absent.
    #[error("{0} is not set. Provide it on the command line or in the .env file")]
    MissingApiKey(&'static str),

    /// A MaxMind database could not be parsed.
    #[error("Invalid GeoIP database `{}`: {detail}", path.display())]
    InvalidDatabase {
        /// Path of the database
        path: PathBuf,
        /// Reader error message
        detail: String,
    },

    /// No usable target address was provided.
    #[error("No valid IP address was provided as geolocation target")]
    NoTargets,

    /// The output file location cannot be written.
    #[error("No write permission for the output location `{}`", .0.display())]
    OutputNotWritable(PathBuf),
}

/// Failures of an external service (PeeringDB, RIPE Atlas, Google Geocoding).
///
/// Everything except [`CollaboratorError::Rejected`] is treated as "no data
/// from this source" by the callers.
#[derive(Error, Debug)]
pub enum CollaboratorError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("{service} request failed: {source}")]
    Http {
        /// Service name
        service: &'static str,
        /// Underlying reqwest error
        #[source]
        source: ReqwestError,
    },

    /// Non-success HTTP status.
    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        /// Service name
        service: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body (truncated)
        body: String,
    },

    /// The service refused our credentials.
    #[error("{service} rejected the request: {detail}")]
    Rejected {
        /// Service name
        service: &'static str,
        /// Message returned by the service
        detail: String,
    },

    /// The service answered with an application-level error.
    #[error("{service} API error: {detail}")]
    Api {
        /// Service name
        service: &'static str,
        /// Message returned by the service
        detail: String,
    },

    /// The response could not be decoded.
    #[error("{service} returned a malformed response: {detail}")]
    Malformed {
        /// Service name
        service: &'static str,
        /// Decoder message
        detail: String,
    },
}

impl CollaboratorError {
    /// Rejected credentials make every later request fail the same way.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CollaboratorError::Rejected { .. })
    }

    /// Determines if the failed request should be retried.
    ///
    /// Timeouts, connection failures, 429 and 5xx responses are transient;
    /// everything else fails the same way on every attempt.
    pub fn is_retriable(&self) -> bool {
        match self {
            CollaboratorError::Http { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request()
            }
            CollaboratorError::Status { status, .. } => {
                *status == crate::config::HTTP_STATUS_TOO_MANY_REQUESTS
                    || (500..600).contains(status)
            }
            _ => false,
        }
    }
}

/// Final outcome of one target address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum OutcomeType {
    /// Minimum RTT below the acceptance threshold
    Accepted,
    /// Probed, but the minimum RTT was at or above the threshold
    Inconclusive,
    /// Probes were selected but none returned an RTT
    Unreachable,
    /// No source produced a candidate location
    NoPresence,
    /// Candidate locations exist but no probe could be selected
    NoVantagePoints,
    /// The ASN of the address could not be determined
    UnknownAsn,
}

impl std::fmt::Display for OutcomeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl OutcomeType {
    /// Returns a human-readable string representation of the outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeType::Accepted => "Accepted",
            OutcomeType::Inconclusive => "Inconclusive (RTT above threshold)",
            OutcomeType::Unreachable => "Unreachable from selected probes",
            OutcomeType::NoPresence => "No presence data",
            OutcomeType::NoVantagePoints => "No probes near candidate locations",
            OutcomeType::UnknownAsn => "Unknown ASN",
        }
    }
}
