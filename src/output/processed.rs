//! Reading back an existing output file.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::IpAddr;
use std::path::Path;

use log::{debug, warn};

use crate::error_handling::ConfigError;

/// Addresses already present in the output file at `path`.
///
/// Takes the first column of every line that is not a `#` comment. A
/// missing file means nothing was processed yet.
pub fn read_processed_ips(path: &Path) -> Result<HashSet<IpAddr>, ConfigError> {
    if !path.exists() {
        return Ok(HashSet::new());
    }
    let file = File::open(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let mut processed = HashSet::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let first = line.split('\t').next().unwrap_or_default().trim();
        match first.parse::<IpAddr>() {
            Ok(ip) => {
                processed.insert(ip);
            }
            Err(_) => warn!(
                "Ignoring line {} of {}: `{}` is not an IP address",
                index + 1,
                path.display(),
                first
            ),
        }
    }
    debug!(
        "{} addresses already processed in {}",
        processed.len(),
        path.display()
    );
    Ok(processed)
}

/// Checks that results can be appended at `path`.
///
/// The parent directory must exist and be writable, and an existing file
/// must not be read-only.
pub fn ensure_output_writable(path: &Path) -> Result<(), ConfigError> {
    let not_writable = || ConfigError::OutputNotWritable(path.to_path_buf());

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let dir = std::fs::metadata(parent).map_err(|_| not_writable())?;
    if !dir.is_dir() || dir.permissions().readonly() {
        return Err(not_writable());
    }
    if let Ok(existing) = std::fs::metadata(path) {
        if existing.is_dir() || existing.permissions().readonly() {
            return Err(not_writable());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_processed_ips_skips_comments() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# ip\tasn\tcity").unwrap();
        writeln!(file, "8.8.8.8\t15169\t-").unwrap();
        writeln!(file, "2001:db8::1\t64500\t-").unwrap();
        writeln!(file, "garbage").unwrap();
        writeln!(file).unwrap();

        let processed = read_processed_ips(file.path()).unwrap();
        assert_eq!(processed.len(), 2);
        assert!(processed.contains(&"8.8.8.8".parse().unwrap()));
        assert!(processed.contains(&"2001:db8::1".parse().unwrap()));
    }

    #[test]
    fn test_read_processed_ips_missing_file() {
        let processed = read_processed_ips(Path::new("/nonexistent/out.tsv")).unwrap();
        assert!(processed.is_empty());
    }

    #[test]
    fn test_output_in_missing_directory_is_not_writable() {
        let result = ensure_output_writable(Path::new("/nonexistent/dir/out.tsv"));
        assert!(matches!(result, Err(ConfigError::OutputNotWritable(_))));
    }

    #[test]
    fn test_output_in_temp_dir_is_writable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ensure_output_writable(&dir.path().join("out.tsv")).is_ok());
    }
}
