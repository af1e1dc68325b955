//! Most populous city per country.
//!
//! Built from the MaxMind world cities file
//! (`Country,City,AccentCity,Region,Population,Latitude,Longitude`), which
//! uses lowercase ISO country codes. Rows without a population are ignored.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use log::info;

use crate::error_handling::ConfigError;

#[derive(Debug, Clone)]
struct City {
    name: String,
    population: u64,
}

/// Country code to its most populous city.
#[derive(Debug, Default, Clone)]
pub struct Gazetteer {
    largest: HashMap<String, City>,
}

impl Gazetteer {
    /// Empty gazetteer; every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the world cities file, gzip-compressed when it ends in `.gz`.
    ///
    /// # Errors
    ///
    /// Missing or unreadable files are configuration errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingFile {
                flag: "--world-cities",
                path: path.to_path_buf(),
            });
        }
        let unreadable = |source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(unreadable)?;
        let gazetteer = if path.extension().is_some_and(|ext| ext == "gz") {
            Self::parse(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Self::parse(BufReader::new(file))
        }
        .map_err(unreadable)?;
        info!(
            "Loaded largest cities for {} countries from {}",
            gazetteer.largest.len(),
            path.display()
        );
        Ok(gazetteer)
    }

    /// Parses comma-separated city rows.
    ///
    /// Ties keep the first city seen.
    pub fn parse<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let mut largest: HashMap<String, City> = HashMap::new();
        // world cities files are Latin-1; invalid UTF-8 is replaced, not fatal
        for line in reader.split(b'\n') {
            let line = line?;
            let line = String::from_utf8_lossy(&line);
            let fields: Vec<&str> = line.trim().split(',').collect();
            if fields.len() < 5 {
                continue;
            }
            let Ok(population) = fields[4].trim().parse::<u64>() else {
                continue;
            };
            let country = fields[0].trim().to_lowercase();
            let name = fields[1].trim().to_lowercase();
            if country.is_empty() || name.is_empty() {
                continue;
            }
            let is_larger = largest
                .get(&country)
                .map_or(true, |current| population > current.population);
            if is_larger {
                largest.insert(country, City { name, population });
            }
        }
        Ok(Self { largest })
    }

    /// Most populous city of `country_code`, lowercased.
    pub fn largest_city(&self, country_code: &str) -> Option<&str> {
        self.largest
            .get(&country_code.to_lowercase())
            .map(|city| city.name.as_str())
    }
}
