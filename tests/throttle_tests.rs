// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the RPC concurrency throttle
//!
//! These tests run on paused Tokio time so cooldowns are exact.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use circlescan::{CirclescanConfig, RpcThrottle};
use tokio::time::Instant;

/// Default throttle admits three calls and cools down for 200ms
#[test]
fn test_default_limits() {
    let throttle = RpcThrottle::from_config(&CirclescanConfig::default().throttle);
    assert_eq!(throttle.max_concurrent(), 3);
    assert_eq!(throttle.release_delay(), Duration::from_millis(200));
}

/// Never more than three tasks run at once, however many are submitted
#[tokio::test(start_paused = true)]
async fn test_peak_concurrency_is_bounded() {
    let throttle = RpcThrottle::new(3, Duration::from_millis(200));
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<_> = (0..10)
        .map(|i| {
            let throttle = throttle.clone();
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            tokio::spawn(async move {
                throttle
                    .run(async {
                        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        running.fetch_sub(1, Ordering::SeqCst);
                        i
                    })
                    .await
            })
        })
        .collect();

    let mut results = Vec::new();
    for task in tasks {
        results.push(task.await.unwrap());
    }

    assert_eq!(results, (0..10).collect::<Vec<_>>());
    assert_eq!(peak.load(Ordering::SeqCst), 3);
}

/// A failing task does not hold its slot beyond the cooldown
#[tokio::test(start_paused = true)]
async fn test_failure_releases_slot() {
    let throttle = RpcThrottle::new(3, Duration::from_millis(200));

    let failed: Result<(), &str> = throttle.run(async { Err("rpc down") }).await;
    assert!(failed.is_err());

    let start = Instant::now();
    let outcomes: Vec<_> = (0..3)
        .map(|_| {
            let throttle = throttle.clone();
            tokio::spawn(async move { throttle.run(async { Instant::now() }).await })
        })
        .collect();

    let mut started = Vec::new();
    for outcome in outcomes {
        started.push(outcome.await.unwrap());
    }

    // Two slots are free immediately, the third opens when the failed
    // task's cooldown ends
    started.sort();
    assert_eq!(started[0], start);
    assert_eq!(started[1], start);
    assert_eq!(started[2].duration_since(start), Duration::from_millis(200));
}

/// With every slot busy, the next task starts 200ms after the first finishes
#[tokio::test(start_paused = true)]
async fn test_fourth_task_waits_for_cooldown() {
    let throttle = RpcThrottle::new(3, Duration::from_millis(200));
    let start = Instant::now();

    let tasks: Vec<_> = (0..4u64)
        .map(|i| {
            let throttle = throttle.clone();
            tokio::spawn(async move {
                throttle
                    .run(async move {
                        let started = Instant::now();
                        tokio::time::sleep(Duration::from_millis(100 * (i + 1))).await;
                        started
                    })
                    .await
            })
        })
        .collect();

    let mut started = Vec::new();
    for task in tasks {
        started.push(task.await.unwrap());
    }

    assert!(started[..3].iter().all(|at| *at == start));
    assert_eq!(started[3].duration_since(start), Duration::from_millis(300));
}

/// Waiters are admitted in the order they queued
#[tokio::test(start_paused = true)]
async fn test_waiters_admitted_in_fifo_order() {
    let throttle = RpcThrottle::new(1, Duration::from_millis(10));
    let order = Arc::new(Mutex::new(Vec::new()));

    let holder = throttle.acquire().await;

    let mut tasks = Vec::new();
    for i in 0..5 {
        let throttle = throttle.clone();
        let order = Arc::clone(&order);
        tasks.push(tokio::spawn(async move {
            throttle.run(async move { order.lock().unwrap().push(i) }).await
        }));
        // Let each task reach the semaphore queue before spawning the next
        tokio::task::yield_now().await;
    }

    drop(holder);
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
}

/// Throttled tasks keep their output type, including errors
#[tokio::test]
async fn test_run_is_transparent_to_results() {
    let throttle = RpcThrottle::new(2, Duration::ZERO);
    let ok: Result<u32, String> = throttle.run(async { Ok(5) }).await;
    let err: Result<u32, String> = throttle.run(async { Err("nope".to_string()) }).await;

    assert_eq!(ok, Ok(5));
    assert_eq!(err, Err("nope".to_string()));
    assert_eq!(throttle.available(), 2);
}
