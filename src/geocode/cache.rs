//! Append-only geocoding caches.
//!
//! Forward entries are `key\tlat\tlon\tcity\tcountry` lines keyed by the
//! normalized location; reverse entries are
//! `lat\tlon\tlocality\tadmin_area\tcountry` lines keyed by `"lat,lon"`.
//! Unknown reverse parts are written as empty fields. Entries are only ever
//! appended, a later line for the same key wins when reading.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use super::{ForwardGeocode, ReverseGeocode};
use crate::config::{FORWARD_CACHE_FILE, REVERSE_CACHE_FILE};
use crate::error_handling::ConfigError;
use crate::models::{Coordinates, Location};

/// Forward and reverse geocoding answers seen so far.
#[derive(Debug, Default)]
pub struct GeocodeCache {
    forward: HashMap<String, ForwardGeocode>,
    reverse: HashMap<String, ReverseGeocode>,
    forward_path: Option<PathBuf>,
    reverse_path: Option<PathBuf>,
}

impl GeocodeCache {
    /// Cache that is not backed by files.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens (creating if needed) the cache files in `dir`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Unreadable` if the directory cannot be created
    /// or an existing cache file cannot be read.
    pub fn open(dir: &Path) -> Result<Self, ConfigError> {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Unreadable {
            path: dir.to_path_buf(),
            source,
        })?;
        let forward_path = dir.join(FORWARD_CACHE_FILE);
        let reverse_path = dir.join(REVERSE_CACHE_FILE);

        let mut forward = HashMap::new();
        for fields in read_entries(&forward_path)? {
            match parse_forward(&fields) {
                Some((key, entry)) => {
                    forward.insert(key, entry);
                }
                None => warn!(
                    "Skipping malformed line in {}: {}",
                    forward_path.display(),
                    fields.join("\t")
                ),
            }
        }

        let mut reverse = HashMap::new();
        for fields in read_entries(&reverse_path)? {
            match parse_reverse(&fields) {
                Some((key, entry)) => {
                    reverse.insert(key, entry);
                }
                None => warn!(
                    "Skipping malformed line in {}: {}",
                    reverse_path.display(),
                    fields.join("\t")
                ),
            }
        }

        info!(
            "Geocoding cache: {} locations, {} coordinates",
            forward.len(),
            reverse.len()
        );
        Ok(Self {
            forward,
            reverse,
            forward_path: Some(forward_path),
            reverse_path: Some(reverse_path),
        })
    }

    /// Cached coordinates of `location`.
    pub fn forward(&self, location: &Location) -> Option<&ForwardGeocode> {
        self.forward.get(&location.key())
    }

    /// Stores and appends a forward answer.
    pub fn insert_forward(&mut self, location: &Location, entry: ForwardGeocode) {
        let key = location.key();
        if let Some(path) = &self.forward_path {
            let line = format!(
                "{}\t{}\t{}\t{}\t{}",
                key,
                entry.coordinates.latitude,
                entry.coordinates.longitude,
                sanitize(&entry.city),
                sanitize(&entry.country)
            );
            append_line(path, &line);
        }
        self.forward.insert(key, entry);
    }

    /// Cached place names at `coordinates`.
    pub fn reverse(&self, coordinates: Coordinates) -> Option<&ReverseGeocode> {
        self.reverse.get(&coordinates.cache_key())
    }

    /// Stores and appends a reverse answer.
    pub fn insert_reverse(&mut self, coordinates: Coordinates, entry: ReverseGeocode) {
        if let Some(path) = &self.reverse_path {
            let part = |value: &Option<String>| value.as_deref().map(sanitize).unwrap_or_default();
            let line = format!(
                "{}\t{}\t{}\t{}\t{}",
                coordinates.latitude,
                coordinates.longitude,
                part(&entry.locality),
                part(&entry.admin_area),
                part(&entry.country)
            );
            append_line(path, &line);
        }
        self.reverse.insert(coordinates.cache_key(), entry);
    }

    /// Number of cached forward answers.
    pub fn forward_len(&self) -> usize {
        self.forward.len()
    }

    /// Number of cached reverse answers.
    pub fn reverse_len(&self) -> usize {
        self.reverse.len()
    }
}

fn read_entries(path: &Path) -> Result<Vec<Vec<String>>, ConfigError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let unreadable = |source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(unreadable)?;
    let mut entries = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(unreadable)?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        entries.push(line.split('\t').map(str::to_string).collect());
    }
    Ok(entries)
}

fn parse_forward(fields: &[String]) -> Option<(String, ForwardGeocode)> {
    if fields.len() != 5 {
        return None;
    }
    let location: Location = fields[0].parse().ok()?;
    let latitude = fields[1].parse().ok()?;
    let longitude = fields[2].parse().ok()?;
    if fields[3].is_empty() || fields[4].is_empty() {
        return None;
    }
    Some((
        location.key(),
        ForwardGeocode {
            coordinates: Coordinates::new(latitude, longitude),
            city: fields[3].clone(),
            country: fields[4].clone(),
        },
    ))
}

fn parse_reverse(fields: &[String]) -> Option<(String, ReverseGeocode)> {
    if fields.len() != 5 {
        return None;
    }
    let latitude: f64 = fields[0].parse().ok()?;
    let longitude: f64 = fields[1].parse().ok()?;
    let part = |value: &String| (!value.is_empty()).then(|| value.clone());
    Some((
        Coordinates::new(latitude, longitude).cache_key(),
        ReverseGeocode {
            locality: part(&fields[2]),
            admin_area: part(&fields[3]),
            country: part(&fields[4]),
        },
    ))
}

fn sanitize(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

fn append_line(path: &Path, line: &str) {
    let result = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| writeln!(file, "{}", line));
    if let Err(e) = result {
        warn!("Appending to `{}` failed: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ashburn() -> ForwardGeocode {
        ForwardGeocode {
            coordinates: Coordinates::new(39.0438, -77.4874),
            city: "Ashburn".to_string(),
            country: "US".to_string(),
        }
    }

    #[test]
    fn test_entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let location = Location::new("Ashburn", "US");
        let here = Coordinates::new(39.0438, -77.4874);
        let names = ReverseGeocode {
            locality: Some("Ashburn".to_string()),
            admin_area: None,
            country: Some("US".to_string()),
        };

        {
            let mut cache = GeocodeCache::open(dir.path()).unwrap();
            cache.insert_forward(&location, ashburn());
            cache.insert_reverse(here, names.clone());
        }

        let cache = GeocodeCache::open(dir.path()).unwrap();
        assert_eq!(cache.forward(&location), Some(&ashburn()));
        assert_eq!(cache.reverse(here), Some(&names));
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(FORWARD_CACHE_FILE),
            "paris|fr\t48.85\t2.35\tParis\tFR\n\
             broken line\n\
             berlin|de\tnot-a-number\t13.4\tBerlin\tDE\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join(REVERSE_CACHE_FILE),
            "48.85\t2.35\tParis\t\tFR\n1.0\t2.0\n",
        )
        .unwrap();

        let cache = GeocodeCache::open(dir.path()).unwrap();
        assert_eq!(cache.forward_len(), 1);
        assert!(cache.forward(&Location::new("PARIS", "FR")).is_some());
        assert_eq!(cache.reverse_len(), 1);
        let paris = cache.reverse(Coordinates::new(48.85, 2.35)).unwrap();
        assert_eq!(paris.admin_area, None);
        assert_eq!(paris.country.as_deref(), Some("FR"));
    }

    #[test]
    fn test_entries_are_appended_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = GeocodeCache::open(dir.path()).unwrap();
        cache.insert_forward(&Location::new("Ashburn", "US"), ashburn());
        cache.insert_forward(&Location::new("Ashburn", "US"), ashburn());

        let content = std::fs::read_to_string(dir.path().join(FORWARD_CACHE_FILE)).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.starts_with("ashburn|us\t39.0438\t-77.4874\tAshburn\tUS"));
    }
}
