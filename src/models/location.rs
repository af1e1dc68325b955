//! Normalized city-level locations.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A city-level location, normalized to lowercase.
///
/// Two locations are equal when their lowercased city and country are equal,
/// so `"Paris|FR"` and `"paris|fr"` collapse into the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    city: String,
    country: String,
}

impl Location {
    /// Creates a location from a city and a country (name or ISO code).
    pub fn new(city: &str, country: &str) -> Self {
        Self {
            city: city.trim().to_lowercase(),
            country: country.trim().to_lowercase(),
        }
    }

    /// Lowercased city name.
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Lowercased country.
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Normalized key `city|country`.
    pub fn key(&self) -> String {
        format!("{}|{}", self.city, self.country)
    }

    /// Free-text form used for forward geocoding.
    pub fn query(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.city, self.country)
    }
}

/// Error returned when a `city|country` key cannot be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid location key `{0}`, expected `city|country`")]
pub struct LocationParseError(pub String);

impl FromStr for Location {
    type Err = LocationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('|') {
            Some((city, country)) if !city.trim().is_empty() && !country.trim().is_empty() => {
                Ok(Location::new(city, country))
            }
            _ => Err(LocationParseError(s.to_string())),
        }
    }
}
