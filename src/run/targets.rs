//! Target address input.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::IpAddr;
use std::path::Path;

use log::{info, warn};

use crate::error_handling::ConfigError;

/// Address to geolocate, with its ASN when given explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    /// Target address
    pub ip: IpAddr,
    /// ASN announcing the address
    pub asn: Option<u32>,
}

/// Targets from a single `--ip` value or a `--file`.
///
/// # Errors
///
/// A missing target file is a configuration error, as is an input without a
/// single valid address.
pub fn read_targets(
    ip: Option<&str>,
    asn: Option<u32>,
    file: Option<&Path>,
) -> Result<Vec<Target>, ConfigError> {
    let targets = match (ip, file) {
        (Some(ip), _) => match ip.trim().parse::<IpAddr>() {
            Ok(ip) => vec![Target { ip, asn }],
            Err(_) => {
                warn!("`{}` is not a valid IP address", ip);
                Vec::new()
            }
        },
        (None, Some(path)) => {
            if !path.exists() {
                return Err(ConfigError::MissingFile {
                    flag: "-f/--file",
                    path: path.to_path_buf(),
                });
            }
            let file = File::open(path).map_err(|source| ConfigError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;
            parse_targets(BufReader::new(file)).map_err(|source| ConfigError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?
        }
        (None, None) => Vec::new(),
    };

    if targets.is_empty() {
        return Err(ConfigError::NoTargets);
    }
    info!("{} target addresses", targets.len());
    Ok(targets)
}

/// Parses one address per line with an optional ASN in a second column.
///
/// Blank lines and `#` comments are ignored; invalid lines are skipped with
/// a warning naming the line number. An address listed more than once keeps
/// its first line.
pub fn parse_targets<R: BufRead>(reader: R) -> std::io::Result<Vec<Target>> {
    let mut targets = Vec::new();
    let mut seen = HashSet::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut fields = trimmed.split_whitespace();
        let Some(Ok(ip)) = fields.next().map(str::parse::<IpAddr>) else {
            warn!("Invalid IP address on line {}: {}", index + 1, trimmed);
            continue;
        };
        let asn = match fields.next() {
            None => None,
            Some(field) => {
                let digits = field
                    .strip_prefix("AS")
                    .or_else(|| field.strip_prefix("as"))
                    .unwrap_or(field);
                match digits.parse::<u32>() {
                    Ok(asn) => Some(asn),
                    Err(_) => {
                        warn!("Invalid ASN on line {}: {}", index + 1, trimmed);
                        continue;
                    }
                }
            }
        };
        if !seen.insert(ip) {
            warn!("Duplicate target {} on line {} ignored", ip, index + 1);
            continue;
        }
        targets.push(Target { ip, asn });
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_parse_targets() {
        let data = "# targets\n\
                    80.249.208.1\n\
                    \n\
                    4.2.2.2 701\n\
                    2001:7f8:1::a500:1200:1\tAS1200\n\
                    not-an-ip\n\
                    8.8.8.8 google\n";
        let targets = parse_targets(Cursor::new(data)).unwrap();

        assert_eq!(
            targets,
            vec![
                Target {
                    ip: "80.249.208.1".parse().unwrap(),
                    asn: None
                },
                Target {
                    ip: "4.2.2.2".parse().unwrap(),
                    asn: Some(701)
                },
                Target {
                    ip: "2001:7f8:1::a500:1200:1".parse().unwrap(),
                    asn: Some(1200)
                },
            ]
        );
    }

    #[test]
    fn test_repeated_address_keeps_first_line() {
        let data = "4.2.2.2 701\n8.8.8.8\n4.2.2.2 AS3356\n4.2.2.2\n";
        let targets = parse_targets(Cursor::new(data)).unwrap();

        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].ip, "4.2.2.2".parse::<IpAddr>().unwrap());
        assert_eq!(targets[0].asn, Some(701));
        assert_eq!(targets[1].ip, "8.8.8.8".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_single_ip_target() {
        let targets = read_targets(Some("8.8.8.8"), Some(15169), None).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].asn, Some(15169));
    }

    #[test]
    fn test_invalid_single_ip_is_fatal() {
        let result = read_targets(Some("999.1.1.1"), None, None);
        assert!(matches!(result, Err(ConfigError::NoTargets)));
    }

    #[test]
    fn test_file_without_valid_targets_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# nothing here").unwrap();
        writeln!(file, "example.com").unwrap();
        let result = read_targets(None, None, Some(file.path()));
        assert!(matches!(result, Err(ConfigError::NoTargets)));
    }

    #[test]
    fn test_missing_target_file_is_fatal() {
        let result = read_targets(None, None, Some(Path::new("/nonexistent/targets.txt")));
        assert!(matches!(result, Err(ConfigError::MissingFile { .. })));
    }
}
