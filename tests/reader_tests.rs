// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for cached, deduplicated circle reads

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{address, Address, U256};
use circlescan::CircleReadError;
use helpers::{reader_with, snapshot, MockCircleSource};

const CIRCLE: Address = address!("abcdef0000000000000000000000000000000001");
const CIRCLE_LOWER: &str = "0xabcdef0000000000000000000000000000000001";
const CIRCLE_UPPER: &str = "0xABCDEF0000000000000000000000000000000001";
const OTHER: Address = address!("00000000000000000000000000000000000000b2");
const ALICE: Address = address!("00000000000000000000000000000000000a11ce");
const BOB: Address = address!("0000000000000000000000000000000000000b0b");

/// A snapshot stored under one letter case is found under any other
#[tokio::test]
async fn test_cache_lookup_ignores_address_case() {
    let mock = Arc::new(MockCircleSource::new().with_circle(snapshot(CIRCLE, "Weekly"), [ALICE]));
    let reader = reader_with(Arc::clone(&mock));

    let fetched = reader.fetch_circle_snapshot(CIRCLE_UPPER).await.unwrap();
    assert_eq!(fetched.curr_round, 2);
    assert_eq!(fetched.num_rounds, 10);
    assert_eq!(fetched.installment_size, U256::from(100u64));

    let cached = reader.cached_snapshot(CIRCLE_LOWER).expect("cached under lower case");
    assert_eq!(cached, fetched);

    let again = reader.circle_snapshot(CIRCLE_LOWER).await.unwrap();
    assert_eq!(again, fetched);
    assert_eq!(mock.snapshot_calls(), 1, "cache hit must not refetch");
}

/// Concurrent requests for one address share a single underlying fetch
#[tokio::test(start_paused = true)]
async fn test_concurrent_fetches_are_deduplicated() {
    let mock = Arc::new(
        MockCircleSource::new()
            .with_circle(snapshot(CIRCLE, "Weekly"), [ALICE, BOB])
            .with_delay(Duration::from_millis(100)),
    );
    let reader = reader_with(Arc::clone(&mock));

    let (a, b, c) = tokio::join!(
        reader.fetch_circle_snapshot(CIRCLE_LOWER),
        reader.fetch_circle_snapshot(CIRCLE_UPPER),
        reader.fetch_circle_snapshot(CIRCLE_LOWER),
    );

    assert_eq!(mock.snapshot_calls(), 1);
    assert_eq!(a.unwrap(), b.as_ref().unwrap().clone());
    assert_eq!(c.unwrap().name, "Weekly");
    assert_eq!(reader.in_flight(), 0, "finished fetches leave the in-flight map");

    let (users_a, users_b) = tokio::join!(
        reader.fetch_registered_users(CIRCLE_LOWER),
        reader.fetch_registered_users(CIRCLE_UPPER),
    );
    assert_eq!(mock.user_calls(), 1);
    assert_eq!(users_a.unwrap().len(), 2);
    assert_eq!(users_b.unwrap().len(), 2);
}

/// Sequential fetches each hit the source
#[tokio::test]
async fn test_fetch_after_completion_starts_new_request() {
    let mock = Arc::new(MockCircleSource::new().with_circle(snapshot(CIRCLE, "Weekly"), []));
    let reader = reader_with(Arc::clone(&mock));

    reader.fetch_circle_snapshot(CIRCLE_LOWER).await.unwrap();
    reader.fetch_circle_snapshot(CIRCLE_LOWER).await.unwrap();
    assert_eq!(mock.snapshot_calls(), 2);
}

/// A failed refresh reports the error and keeps the previous snapshot
#[tokio::test]
async fn test_failed_refresh_keeps_cached_snapshot() {
    let mock = Arc::new(MockCircleSource::new().with_circle(snapshot(CIRCLE, "Weekly"), [ALICE]));
    let reader = reader_with(Arc::clone(&mock));

    let first = reader.fetch_circle_snapshot(CIRCLE_LOWER).await.unwrap();

    let mut advanced = snapshot(CIRCLE, "Weekly");
    advanced.curr_round = 3;
    mock.set_circle(advanced, [ALICE]);
    mock.set_failing(true);

    let err = reader.fetch_circle_snapshot(CIRCLE_LOWER).await.unwrap_err();
    assert!(err.is_transient());
    assert_eq!(reader.cached_snapshot(CIRCLE_LOWER), Some(first));

    mock.set_failing(false);
    let refreshed = reader.fetch_circle_snapshot(CIRCLE_LOWER).await.unwrap();
    assert_eq!(refreshed.curr_round, 3);
    assert_eq!(reader.cached_snapshot(CIRCLE_UPPER), Some(refreshed));
}

/// Malformed addresses fail without touching the source
#[tokio::test]
async fn test_invalid_address_is_rejected() {
    let mock = Arc::new(MockCircleSource::new());
    let reader = reader_with(Arc::clone(&mock));

    let err = reader.fetch_circle_snapshot("0x1234").await.unwrap_err();
    assert!(matches!(*err, CircleReadError::InvalidAddress { .. }));
    assert_eq!(mock.snapshot_calls(), 0);
}

/// Invalidation can target one address or all of them
#[tokio::test]
async fn test_invalidate_single_and_all() {
    let mock = Arc::new(
        MockCircleSource::new()
            .with_circle(snapshot(CIRCLE, "Weekly"), [ALICE])
            .with_circle(snapshot(OTHER, "Monthly"), [BOB]),
    );
    let reader = reader_with(Arc::clone(&mock));

    for address in [CIRCLE_LOWER, &format!("{OTHER:#x}")] {
        reader.fetch_circle_snapshot(address).await.unwrap();
        reader.fetch_registered_users(address).await.unwrap();
    }
    assert_eq!(reader.circle_cache().len(), 2);

    reader.invalidate(Some(CIRCLE_UPPER));
    assert!(reader.cached_snapshot(CIRCLE_LOWER).is_none());
    assert!(reader.cached_registered_users(CIRCLE_LOWER).is_none());
    assert!(reader.circle_cache().contains(OTHER));

    reader.invalidate(None);
    assert!(reader.circle_cache().is_empty());
    assert!(reader.users_cache().is_empty());
}

/// Member lists are cached independently from snapshots
#[tokio::test]
async fn test_registered_users_cache_first() {
    let mock = Arc::new(MockCircleSource::new().with_circle(snapshot(CIRCLE, "Weekly"), [ALICE, BOB]));
    let reader = reader_with(Arc::clone(&mock));

    let users = reader.registered_users(CIRCLE_UPPER).await.unwrap();
    assert!(users.contains(&ALICE));
    assert!(users.contains_str("0x0000000000000000000000000000000000000B0B"));

    reader.registered_users(CIRCLE_LOWER).await.unwrap();
    assert_eq!(mock.user_calls(), 1);
    assert_eq!(mock.snapshot_calls(), 0);
}

/// Unreadable circles are dropped from the listing and the rest sorted by name
#[tokio::test]
async fn test_list_circles_skips_failures_and_sorts() {
    let mock = Arc::new(
        MockCircleSource::new()
            .with_circle(snapshot(CIRCLE, "Zeta"), [ALICE, BOB])
            .with_circle(snapshot(OTHER, "Alpha"), [ALICE]),
    );
    let reader = reader_with(Arc::clone(&mock));

    let addresses = vec![
        CIRCLE_UPPER.to_string(),
        "0x00000000000000000000000000000000000000c3".to_string(),
        "garbage".to_string(),
        format!("{OTHER:#x}"),
    ];
    let rows = reader.list_circles(&addresses).await;

    let names: Vec<&str> = rows.iter().map(|row| row.contract.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Zeta"]);

    let zeta = &rows[1];
    assert_eq!(zeta.id, CIRCLE_LOWER);
    assert_eq!(zeta.members, 2);
    assert_eq!(zeta.max_members, 10);
    assert_eq!(zeta.prize, U256::from(1000u64));
    assert!(!zeta.is_full());
}

/// An empty address list yields an empty listing
#[tokio::test]
async fn test_list_circles_empty() {
    let reader = reader_with(Arc::new(MockCircleSource::new()));
    let rows = reader.list_circles::<String>(&[]).await;
    assert!(rows.is_empty());
}

/// Disposing clears every cache
#[tokio::test]
async fn test_dispose_clears_caches() {
    let mock = Arc::new(MockCircleSource::new().with_circle(snapshot(CIRCLE, "Weekly"), [ALICE]));
    let reader = reader_with(Arc::clone(&mock));

    reader.fetch_circle_snapshot(CIRCLE_LOWER).await.unwrap();
    reader.fetch_registered_users(CIRCLE_LOWER).await.unwrap();
    reader.dispose();

    assert!(reader.circle_cache().is_empty());
    assert!(reader.users_cache().is_empty());
    assert_eq!(reader.in_flight(), 0);
}

/// A fetch keeps running after its only waiter gives up
#[tokio::test(start_paused = true)]
async fn test_abandoned_fetch_still_completes() {
    let mock = Arc::new(
        MockCircleSource::new()
            .with_circle(snapshot(CIRCLE, "Weekly"), [ALICE])
            .with_delay(Duration::from_millis(100)),
    );
    let reader = reader_with(Arc::clone(&mock));

    let gave_up = tokio::time::timeout(
        Duration::from_millis(10),
        reader.fetch_circle_snapshot(CIRCLE_LOWER),
    )
    .await;
    assert!(gave_up.is_err());
    assert!(reader.cached_snapshot(CIRCLE_LOWER).is_none());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(reader.cached_snapshot(CIRCLE_LOWER).is_some());
    assert_eq!(reader.in_flight(), 0);
    assert_eq!(mock.snapshot_calls(), 1);
}

/// A fetch that finishes after dispose answers its waiter but leaves the caches empty
#[tokio::test(start_paused = true)]
async fn test_dispose_during_fetch_keeps_caches_empty() {
    let mock = Arc::new(
        MockCircleSource::new()
            .with_circle(snapshot(CIRCLE, "Weekly"), [ALICE])
            .with_delay(Duration::from_millis(100)),
    );
    let reader = reader_with(Arc::clone(&mock));

    let snapshot_fetch = tokio::spawn({
        let reader = Arc::clone(&reader);
        async move { reader.fetch_circle_snapshot(CIRCLE_LOWER).await }
    });
    let users_fetch = tokio::spawn({
        let reader = Arc::clone(&reader);
        async move { reader.fetch_registered_users(CIRCLE_LOWER).await }
    });

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(reader.in_flight(), 2);
    reader.dispose();

    assert_eq!(snapshot_fetch.await.unwrap().unwrap().name, "Weekly");
    assert_eq!(users_fetch.await.unwrap().unwrap().len(), 1);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(reader.circle_cache().is_empty());
    assert!(reader.users_cache().is_empty());
    assert_eq!(reader.in_flight(), 0);

    reader.fetch_circle_snapshot(CIRCLE_LOWER).await.unwrap();
    assert!(reader.cached_snapshot(CIRCLE_LOWER).is_some(), "fetches after dispose cache again");
}
