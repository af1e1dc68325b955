//! Manually curated presence data.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{info, warn};

use crate::error_handling::ConfigError;
use crate::models::Location;

/// Locations known for an ASN from a static file, added to every lookup.
#[derive(Debug, Default, Clone)]
pub struct PresenceOverrides {
    locations: HashMap<u32, BTreeSet<Location>>,
}

impl PresenceOverrides {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a location for `asn`.
    pub fn insert(&mut self, asn: u32, location: Location) {
        self.locations.entry(asn).or_default().insert(location);
    }

    /// Locations listed for `asn`.
    pub fn locations(&self, asn: u32) -> impl Iterator<Item = &Location> + '_ {
        self.locations
            .get(&asn)
            .into_iter()
            .flat_map(|set| set.iter())
    }

    /// Number of ASNs with at least one location.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// Loads a presence file.
///
/// # Errors
///
/// A missing or unreadable file is a configuration error.
pub fn load_presence_overrides(path: &Path) -> Result<PresenceOverrides, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile {
            flag: "-p/--presence",
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let overrides =
        parse_presence_overrides(BufReader::new(file)).map_err(|source| {
            ConfigError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        })?;
    info!(
        "Loaded presence data for {} ASNs from {}",
        overrides.len(),
        path.display()
    );
    Ok(overrides)
}

/// Parses `ASN<TAB>City<TAB>Country [comment]` lines.
///
/// Lines without tabs are split on whitespace, which only works for
/// single-word cities. Lines with fewer than three fields are ignored, lines
/// with an invalid ASN are skipped with a warning.
pub fn parse_presence_overrides<R: BufRead>(reader: R) -> std::io::Result<PresenceOverrides> {
    let mut overrides = PresenceOverrides::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.starts_with('#') {
            continue;
        }
        let trimmed = line.trim();
        let fields: Vec<&str> = if trimmed.contains('\t') {
            trimmed.split('\t').map(str::trim).collect()
        } else {
            trimmed.split_whitespace().collect()
        };
        if fields.len() < 3 {
            continue;
        }
        let Ok(asn) = fields[0].parse::<u32>() else {
            warn!(
                "Skipping presence line {} with invalid ASN: {}",
                index + 1,
                trimmed
            );
            continue;
        };
        if fields[1].is_empty() || fields[2].is_empty() {
            warn!("Skipping incomplete presence line {}: {}", index + 1, trimmed);
            continue;
        }
        overrides.insert(asn, Location::new(fields[1], fields[2]));
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_parse_presence_lines() {
        let data = "# ASN\tCity\tCountry\n\
                    1200\tAmsterdam\tNL\n\
                    1200\tamsterdam\tnl\tduplicate\n\
                    3356\tNew York\tUS\n\
                    6939 Fremont US\n\
                    AS42\tParis\tFR\n\
                    64500\tLonely\n";
        let overrides = parse_presence_overrides(Cursor::new(data)).unwrap();

        assert_eq!(overrides.len(), 3);
        assert_eq!(overrides.locations(1200).count(), 1);
        assert_eq!(
            overrides.locations(3356).next(),
            Some(&Location::new("new york", "us"))
        );
        assert_eq!(
            overrides.locations(6939).next(),
            Some(&Location::new("fremont", "us"))
        );
        assert_eq!(overrides.locations(64500).count(), 0);
    }

    #[test]
    fn test_load_presence_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "701\tAshburn\tUS").unwrap();

        let overrides = load_presence_overrides(file.path()).unwrap();
        assert_eq!(overrides.locations(701).count(), 1);
    }

    #[test]
    fn test_load_missing_presence_file() {
        let result = load_presence_overrides(Path::new("/nonexistent/presence.tsv"));
        assert!(matches!(result, Err(ConfigError::MissingFile { .. })));
    }
}
