//! Relationship file loading.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;
use log::{info, warn};

use super::{AsRelationships, Relationship};
use crate::error_handling::ConfigError;

/// Loads a CAIDA relationship file.
///
/// Files ending in `.bz2` (as CAIDA publishes them) are read through bzip2,
/// files ending in `.gz` through gzip, anything else as plain text.
///
/// # Errors
///
/// Returns `ConfigError::MissingFile` if the file does not exist and
/// `ConfigError::Unreadable` if it cannot be opened or decompressed.
pub fn load_relationships(path: &Path) -> Result<AsRelationships, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile {
            flag: "-r/--relations",
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let reader: Box<dyn BufRead> = match path.extension().and_then(|ext| ext.to_str()) {
        Some("bz2") => Box::new(BufReader::new(MultiBzDecoder::new(file))),
        Some("gz") => Box::new(BufReader::new(MultiGzDecoder::new(file))),
        _ => Box::new(BufReader::new(file)),
    };

    let relationships =
        parse_relationships(reader).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
    info!(
        "Loaded {} AS relationships from {}",
        relationships.len(),
        path.display()
    );
    Ok(relationships)
}

/// Parses `as1|as2|code[|source]` lines.
///
/// `#` lines are comments; malformed lines are skipped with a warning.
/// Only I/O errors are returned.
pub fn parse_relationships<R: BufRead>(reader: R) -> std::io::Result<AsRelationships> {
    let mut relationships = AsRelationships::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match parse_line(trimmed) {
            Some((a, b, relationship)) => relationships.insert(a, b, relationship),
            None => warn!(
                "Skipping malformed relationship on line {}: {}",
                index + 1,
                trimmed
            ),
        }
    }
    Ok(relationships)
}

fn parse_line(line: &str) -> Option<(u32, u32, Relationship)> {
    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() != 3 && fields.len() != 4 {
        return None;
    }
    let a = fields[0].trim().parse().ok()?;
    let b = fields[1].trim().parse().ok()?;
    let code = fields[2].trim().parse().ok()?;
    Some((a, b, Relationship::from_code(code)?))
}
