//! End-to-end tests of the run driver with in-memory collaborators.
//!
//! These tests verify that a target flows through aggregation, selection,
//! probing and inference into exactly one output line, and that targets
//! already present in the output are not measured again.

mod helpers;

use std::io::{Cursor, Write};
use std::net::IpAddr;
use std::path::Path;

use helpers::{vantage_point, FakeGeocoder, FakeLocator, FakePlatform, FakePresence};
use rtt_geoloc::geocode::{GeocodeCache, ReverseGeocode};
use rtt_geoloc::models::Location;
use rtt_geoloc::presence::PresenceOverrides;
use rtt_geoloc::relationships::AsRelationships;
use rtt_geoloc::{
    parse_targets, run_targets, Collaborators, Config, GeolocationPipeline, PipelineSettings, Target,
};

type TestPipeline = GeolocationPipeline<FakePresence, FakeLocator, FakeGeocoder, FakePlatform>;

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

/// Ashburn target of AS701 without any PeeringDB presence: the only hint is
/// GeoIP, and a single probe within 40 km answers with 4.2 ms.
fn ashburn_pipeline(accept_threshold_ms: f64) -> TestPipeline {
    ashburn_pipeline_with(accept_threshold_ms, ashburn_locator())
}

fn ashburn_locator() -> FakeLocator {
    let mut locator = FakeLocator::default();
    locator
        .locations
        .insert(ip("4.2.2.2"), Location::new("Ashburn", "US"));
    locator
}

fn ashburn_pipeline_with(accept_threshold_ms: f64, locator: FakeLocator) -> TestPipeline {
    let geocoder = FakeGeocoder {
        reverse: Some(ReverseGeocode {
            locality: Some("Ashburn".to_string()),
            admin_area: Some("Loudoun County".to_string()),
            country: Some("US".to_string()),
        }),
        ..Default::default()
    }
    .with_city("Ashburn", "US", 39.0438, -77.4874);

    let mut platform = FakePlatform::default();
    platform.add(vantage_point(6001, 64500, 39.05, -77.45, "US"));
    // New York, outside the radius
    platform.add(vantage_point(6002, 64501, 40.71, -74.01, "US"));
    platform.rtts.insert(6001, vec![4.5, 4.2, 4.9]);
    platform.rtts.insert(6002, vec![1.0]);

    let config = Config {
        accept_threshold_ms,
        ..Default::default()
    };
    GeolocationPipeline::new(
        Collaborators {
            presence: FakePresence::default(),
            locator,
            geocoder,
            platform,
        },
        PresenceOverrides::new(),
        AsRelationships::new(),
        GeocodeCache::in_memory(),
        PipelineSettings::from(&config),
        Some(42),
    )
}

fn ashburn_target() -> Target {
    Target {
        ip: ip("4.2.2.2"),
        asn: Some(701),
    }
}

fn result_lines(path: &Path) -> Vec<Vec<String>> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|line| !line.starts_with('#'))
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}

#[tokio::test]
async fn test_accepted_below_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("geolocation.tsv");
    let mut pipeline = ashburn_pipeline(5.0);

    let report = run_targets(&mut pipeline, &[ashburn_target()], &output)
        .await
        .unwrap();

    assert_eq!(report.total_targets, 1);
    assert_eq!(report.accepted, 1);
    assert_eq!(report.rejected, 0);

    let lines = result_lines(&output);
    assert_eq!(lines.len(), 1);
    let fields = &lines[0];
    assert_eq!(fields.len(), 11);
    assert_eq!(fields[0], "4.2.2.2");
    assert_eq!(fields[1], "701");
    assert_eq!(fields[2], "Ashburn");
    assert_eq!(fields[3], "Loudoun County");
    assert_eq!(fields[4], "US");
    assert_eq!(fields[5], "39.05");
    assert_eq!(fields[6], "-77.45");
    assert_eq!(fields[7], "4.2");
    assert_eq!(fields[8], "ashburn");
}

#[tokio::test]
async fn test_rejected_above_threshold_keeps_rtt() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("geolocation.tsv");
    let mut pipeline = ashburn_pipeline(2.0);

    let report = run_targets(&mut pipeline, &[ashburn_target()], &output)
        .await
        .unwrap();

    assert_eq!(report.accepted, 0);
    assert_eq!(report.rejected, 1);

    let lines = result_lines(&output);
    assert_eq!(lines.len(), 1);
    let fields = &lines[0];
    assert_eq!(fields[0], "4.2.2.2");
    assert_eq!(fields[1], "701");
    assert!(fields[2..7].iter().all(|f| f == "-"));
    assert_eq!(fields[7], "4.2");
}

#[tokio::test]
async fn test_only_probes_within_radius_are_pinged() {
    let mut pipeline = ashburn_pipeline(5.0);
    let result = pipeline.geolocate(&ashburn_target()).await.unwrap();

    assert_eq!(result.closest_vantage_point, Some(6001));
    assert_eq!(result.min_rtt, Some(4.2));
    assert!(result.is_accepted());
}

#[tokio::test]
async fn test_already_processed_targets_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("geolocation.tsv");
    {
        let mut file = std::fs::File::create(&output).unwrap();
        writeln!(file, "# ip\tasn").unwrap();
        writeln!(
            file,
            "8.8.8.8\t15169\t-\t-\t-\t-\t-\t-\t-\t1700000000\t2023-11-14T22:13:20Z"
        )
        .unwrap();
    }
    let mut pipeline = ashburn_pipeline(5.0);
    let targets = [
        Target {
            ip: ip("8.8.8.8"),
            asn: Some(15169),
        },
        ashburn_target(),
    ];

    let report = run_targets(&mut pipeline, &targets, &output).await.unwrap();
    assert_eq!(report.total_targets, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.accepted, 1);

    let lines = result_lines(&output);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0][0], "8.8.8.8");
    assert_eq!(lines[1][0], "4.2.2.2");

    // a second pass has nothing left to do
    let report = run_targets(&mut pipeline, &targets, &output).await.unwrap();
    assert_eq!(report.skipped, 2);
    assert_eq!(result_lines(&output).len(), 2);
}

#[tokio::test]
async fn test_unknown_asn_and_no_presence_are_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("geolocation.tsv");
    let mut pipeline = ashburn_pipeline(5.0);
    let targets = [
        // no explicit ASN and none from GeoIP
        Target {
            ip: ip("192.0.2.1"),
            asn: None,
        },
        // ASN known but no source has a location
        Target {
            ip: ip("198.51.100.1"),
            asn: Some(64496),
        },
    ];

    let report = run_targets(&mut pipeline, &targets, &output).await.unwrap();
    assert_eq!(report.rejected, 2);

    let lines = result_lines(&output);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0][1], "-");
    assert_eq!(lines[1][1], "64496");
    assert_eq!(lines[1][7], "-");
}

#[tokio::test]
async fn test_repeated_target_is_measured_once() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("geolocation.tsv");
    let mut pipeline = ashburn_pipeline(5.0);

    let targets = parse_targets(Cursor::new("4.2.2.2 701\n4.2.2.2 701\n")).unwrap();
    assert_eq!(targets, vec![ashburn_target()]);

    // the same address twice in one slice is recorded once
    let report = run_targets(&mut pipeline, &[ashburn_target(), ashburn_target()], &output)
        .await
        .unwrap();
    assert_eq!(report.accepted, 1);
    assert_eq!(report.skipped, 1);

    let lines = result_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0][0], "4.2.2.2");
}

#[tokio::test]
async fn test_geoip_locations_resolved_in_one_batch() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("geolocation.tsv");
    let locator = ashburn_locator();
    let batch_lookups = locator.batch_lookups.clone();
    let single_lookups = locator.single_lookups.clone();
    let mut pipeline = ashburn_pipeline_with(5.0, locator);
    let unknown = Target {
        ip: ip("198.51.100.1"),
        asn: Some(64496),
    };

    let report = run_targets(&mut pipeline, &[ashburn_target(), unknown], &output)
        .await
        .unwrap();
    assert_eq!(report.accepted, 1);
    assert_eq!(report.rejected, 1);

    assert_eq!(
        *batch_lookups.borrow(),
        vec![vec![ip("4.2.2.2"), ip("198.51.100.1")]]
    );
    assert!(single_lookups.borrow().is_empty());
}
