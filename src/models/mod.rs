//! Data model shared by the pipeline stages.

mod location;
mod result;
mod vantage;

pub use location::{Location, LocationParseError};
pub use result::{GeolocationResult, InferredLocation};
pub use vantage::{AddressFamily, Coordinates, RttObservation, VantagePoint, VantagePointId};
