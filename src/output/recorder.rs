//! Append-only tab-separated result sink.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::SecondsFormat;
use log::debug;

use crate::config::{MISSING_FIELD, OUTPUT_HEADER};
use crate::models::GeolocationResult;

/// Formats one output line (without the trailing newline).
///
/// Columns: ip, asn, city, admin_area, country, lat, lon, min_rtt,
/// nearest_facility_city, unix_timestamp, iso_datetime. Missing values are
/// written as `-`; an RTT is `inf` when no probe answered.
pub fn format_record(result: &GeolocationResult) -> String {
    fn text(value: Option<&str>) -> String {
        match value {
            Some(v) if !v.is_empty() => v.replace(['\t', '\n'], " "),
            _ => MISSING_FIELD.to_string(),
        }
    }

    let location = result.location.as_ref();
    let (lat, lon) = match location {
        Some(l) => (
            l.coordinates.latitude.to_string(),
            l.coordinates.longitude.to_string(),
        ),
        None => (MISSING_FIELD.to_string(), MISSING_FIELD.to_string()),
    };
    let min_rtt = match result.min_rtt {
        Some(rtt) if rtt.is_finite() => rtt.to_string(),
        Some(_) => "inf".to_string(),
        None => MISSING_FIELD.to_string(),
    };

    let fields = [
        result.ip.to_string(),
        result
            .asn
            .map_or_else(|| MISSING_FIELD.to_string(), |asn| asn.to_string()),
        text(location.and_then(|l| l.city.as_deref())),
        text(location.and_then(|l| l.admin_area.as_deref())),
        text(location.and_then(|l| l.country.as_deref())),
        lat,
        lon,
        min_rtt,
        text(result.nearest_facility.as_ref().map(|f| f.city())),
        result.timestamp.timestamp().to_string(),
        result
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Secs, true),
    ];
    fields.join("\t")
}

/// Appends `result` to `sink` as one line.
pub fn record<W: Write>(result: &GeolocationResult, sink: &mut W) -> io::Result<()> {
    writeln!(sink, "{}", format_record(result))?;
    sink.flush()
}

/// Output file opened in append mode.
///
/// Lines already in the file are never rewritten.
#[derive(Debug)]
pub struct ResultRecorder {
    file: File,
    path: PathBuf,
}

impl ResultRecorder {
    /// Opens (or creates) `path` for appending and writes the header line
    /// when the file is new or empty.
    pub fn open(path: &Path) -> io::Result<Self> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if file.metadata()?.len() == 0 {
            writeln!(file, "{}", OUTPUT_HEADER)?;
        }
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Appends one result.
    pub fn record(&mut self, result: &GeolocationResult) -> io::Result<()> {
        debug!("Recording {} to {}", result.ip, self.path.display());
        record(result, &mut self.file)
    }

    /// Path of the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
