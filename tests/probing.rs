//! Tests for batched probing.

mod helpers;

use std::collections::BTreeSet;
use std::net::IpAddr;

use helpers::FakePlatform;
use rtt_geoloc::probing::{probe, ProbeParams};

fn params(chunk_size: usize) -> ProbeParams {
    ProbeParams {
        packets: 3,
        chunk_size,
        short_circuit_ms: 2.0,
        description: "probing test".to_string(),
    }
}

fn target() -> IpAddr {
    "192.0.2.10".parse().unwrap()
}

#[tokio::test]
async fn test_batches_partition_the_selection() {
    let mut platform = FakePlatform::default();
    for id in 1..=250u64 {
        platform.rtts.insert(id, vec![20.0 + id as f64]);
    }
    let ids: BTreeSet<u64> = (1..=250).collect();

    let outcome = probe(&platform, &ids, target(), &params(100)).await.unwrap();

    let batches = platform.batches();
    assert_eq!(batches.len(), 3, "ceil(250 / 100) batches");
    assert_eq!(outcome.batches_issued, 3);
    assert!(batches.iter().all(|b| b.len() <= 100));
    let union: Vec<u64> = batches.into_iter().flatten().collect();
    assert_eq!(union, ids.iter().copied().collect::<Vec<_>>(), "ascending, no duplicates");
    assert!(!outcome.short_circuited);
    assert_eq!(outcome.observations.len(), 250);
}

#[tokio::test]
async fn test_stops_once_rtt_below_short_circuit() {
    let mut platform = FakePlatform::default();
    platform.rtts.insert(7, vec![1.5, 3.0]);
    for id in 100..=300u64 {
        platform.rtts.insert(id, vec![0.5]);
    }
    let ids: BTreeSet<u64> = [7u64].into_iter().chain(100..=300).collect();

    let outcome = probe(&platform, &ids, target(), &params(100)).await.unwrap();

    assert_eq!(platform.batches().len(), 1);
    assert!(outcome.short_circuited);
    assert_eq!(outcome.observations[&7], vec![1.5, 3.0]);
}

#[tokio::test]
async fn test_rtt_equal_to_short_circuit_does_not_stop() {
    let mut platform = FakePlatform::default();
    platform.rtts.insert(1, vec![2.0]);
    let ids: BTreeSet<u64> = (1..=4).collect();

    let outcome = probe(&platform, &ids, target(), &params(2)).await.unwrap();

    assert_eq!(platform.batches().len(), 2);
    assert!(!outcome.short_circuited);
}

#[tokio::test]
async fn test_silent_vantage_points_map_to_empty_lists() {
    let mut platform = FakePlatform::default();
    platform.rtts.insert(2, vec![12.0]);
    let ids: BTreeSet<u64> = (1..=3).collect();

    let outcome = probe(&platform, &ids, target(), &params(100)).await.unwrap();

    assert_eq!(outcome.observations.len(), 3);
    assert!(outcome.observations[&1].is_empty());
    assert_eq!(outcome.observations[&2], vec![12.0]);
    assert!(outcome.observations[&3].is_empty());
}

#[tokio::test]
async fn test_failed_batch_is_skipped() {
    let mut platform = FakePlatform::default();
    platform.failing_batch = Some((0, false));
    platform.rtts.insert(3, vec![8.0]);
    let ids: BTreeSet<u64> = (1..=4).collect();

    let outcome = probe(&platform, &ids, target(), &params(2)).await.unwrap();

    assert_eq!(outcome.batches_issued, 2);
    assert!(outcome.observations[&1].is_empty());
    assert_eq!(outcome.observations[&3], vec![8.0]);
}

#[tokio::test]
async fn test_rejected_credentials_stop_probing() {
    let mut platform = FakePlatform::default();
    platform.failing_batch = Some((0, true));
    let ids: BTreeSet<u64> = (1..=4).collect();

    let result = probe(&platform, &ids, target(), &params(2)).await;

    let err = result.err().unwrap();
    assert!(err.is_fatal());
    assert_eq!(platform.batches().len(), 1);
}

#[tokio::test]
async fn test_empty_selection_issues_nothing() {
    let platform = FakePlatform::default();
    let outcome = probe(&platform, &BTreeSet::new(), target(), &params(100))
        .await
        .unwrap();
    assert_eq!(outcome.batches_issued, 0);
    assert!(platform.batches().is_empty());
}
