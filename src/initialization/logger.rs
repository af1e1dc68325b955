//! `env_logger` setup with plain (colored) or JSON line output.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::{Level, LevelFilter};

/// Installs the global logger.
///
/// `RUST_LOG` is read first; `level` then applies to this crate and as the
/// default, while HTTP and TLS internals stay at `info`/`warn`.
///
/// ```bash
/// RUST_LOG=rtt_geoloc::probing=trace rtt_geoloc --ip 80.249.208.1 --log-format json
/// ```
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` when a logger is already set.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for (module, cap) in [
        ("reqwest", LevelFilter::Info),
        ("hyper", LevelFilter::Info),
        ("hyper_util", LevelFilter::Info),
        ("rustls", LevelFilter::Warn),
    ] {
        builder.filter_module(module, cap.min(level));
    }
    builder.filter_module("rtt_geoloc", level);

    match format {
        LogFormat::Json => builder.format(|buf, record| {
            let line = json_line(
                chrono::Utc::now().timestamp_millis(),
                record.level(),
                record.target(),
                &record.args().to_string(),
            );
            writeln!(buf, "{}", line)
        }),
        LogFormat::Plain => builder.format(|buf, record| {
            let (marker, level) = plain_level(record.level());
            writeln!(
                buf,
                "{} {} [{}] {}",
                marker,
                record.target().cyan(),
                level,
                record.args()
            )
        }),
    };

    builder.try_init().map_err(InitializationError::from)
}

/// Marker and colored name of `level` for plain output.
fn plain_level(level: Level) -> (&'static str, ColoredString) {
    let name = level.to_string();
    match level {
        Level::Error => ("❌", name.red()),
        Level::Warn => ("⚠️", name.yellow()),
        Level::Info => ("✔️", name.green()),
        Level::Debug => ("🔍", name.blue()),
        Level::Trace => ("🔬", name.purple()),
    }
}

/// One structured log line: `{"ts":..,"level":..,"target":..,"msg":..}`.
fn json_line(ts_millis: i64, level: Level, target: &str, msg: &str) -> String {
    let msg = serde_json::to_string(msg).unwrap_or_else(|_| "\"\"".into());
    let target = serde_json::to_string(target).unwrap_or_else(|_| "\"\"".into());
    format!(
        "{{\"ts\":{},\"level\":\"{}\",\"target\":{},\"msg\":{}}}",
        ts_millis, level, target, msg
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_line_is_valid_json() {
        let line = json_line(
            1_700_000_000_000,
            Level::Warn,
            "rtt_geoloc::probing",
            "Batch 1/3 towards \"192.0.2.1\" failed",
        );
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["ts"], 1_700_000_000_000i64);
        assert_eq!(value["level"], "WARN");
        assert_eq!(value["target"], "rtt_geoloc::probing");
        assert_eq!(value["msg"], "Batch 1/3 towards \"192.0.2.1\" failed");
    }

    #[test]
    fn test_plain_level_markers() {
        let (marker, name) = plain_level(Level::Error);
        assert_eq!(marker, "❌");
        assert!(name.to_string().contains("ERROR"));
    }

    #[test]
    fn test_init_logger_twice_does_not_panic() {
        // env_logger can only be installed once per process; the second call
        // must surface an error instead of panicking
        let first = init_logger_with(LevelFilter::Info, LogFormat::Plain);
        let second = init_logger_with(LevelFilter::Debug, LogFormat::Json);
        assert!(first.is_err() || second.is_err());
    }
}
