// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for circlescan integration tests
//!
//! Provides an in-memory [`CircleSource`] so reader, observer and registry
//! behavior can be tested without a blockchain connection.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use circlescan::{
    CircleReadError, CircleReader, CircleSnapshot, CircleSource, CirclescanConfigBuilder,
    RegisteredUserSet,
};
use tokio::sync::watch;

/// In-memory circle source
///
/// Allows complete control over returned data, latency and failures.
///
/// # Example
///
/// ```rust,ignore
/// let mock = MockCircleSource::new()
///     .with_circle(snapshot(circle, "Weekly"), [alice, bob])
///     .with_delay(Duration::from_millis(100));
///
/// let reader = reader_with(Arc::new(mock));
/// ```
pub struct MockCircleSource {
    snapshots: Mutex<HashMap<Address, CircleSnapshot>>,
    users: Mutex<HashMap<Address, RegisteredUserSet>>,
    snapshot_calls: AtomicUsize,
    user_calls: AtomicUsize,
    failing: AtomicBool,
    delay: Duration,
    gate: watch::Sender<bool>,
}

impl MockCircleSource {
    /// Create a source that knows no circles
    pub fn new() -> Self {
        Self {
            snapshots: Mutex::new(HashMap::new()),
            users: Mutex::new(HashMap::new()),
            snapshot_calls: AtomicUsize::new(0),
            user_calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            delay: Duration::ZERO,
            gate: watch::channel(true).0,
        }
    }

    /// Register a circle and its members
    pub fn with_circle(
        self,
        snapshot: CircleSnapshot,
        members: impl IntoIterator<Item = Address>,
    ) -> Self {
        self.set_circle(snapshot, members);
        self
    }

    /// Delay every fetch by `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Replace a circle's data
    pub fn set_circle(&self, snapshot: CircleSnapshot, members: impl IntoIterator<Item = Address>) {
        let address = snapshot.address;
        self.users
            .lock()
            .unwrap()
            .insert(address, members.into_iter().collect());
        self.snapshots.lock().unwrap().insert(address, snapshot);
    }

    /// Make every subsequent fetch fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Hold every fetch until [`open_gate`](Self::open_gate)
    pub fn close_gate(&self) {
        self.gate.send_replace(false);
    }

    /// Release held fetches
    pub fn open_gate(&self) {
        self.gate.send_replace(true);
    }

    pub fn snapshot_calls(&self) -> usize {
        self.snapshot_calls.load(Ordering::SeqCst)
    }

    pub fn user_calls(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst)
    }

    async fn wait(&self) -> Result<(), CircleReadError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;

        if self.failing.load(Ordering::SeqCst) {
            return Err(CircleReadError::decode_failed("mock failure"));
        }
        Ok(())
    }
}

impl Default for MockCircleSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CircleSource for MockCircleSource {
    async fn fetch_snapshot(&self, circle: Address) -> Result<CircleSnapshot, CircleReadError> {
        self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await?;
        self.snapshots
            .lock()
            .unwrap()
            .get(&circle)
            .cloned()
            .ok_or_else(|| CircleReadError::decode_failed(format!("unknown circle {circle}")))
    }

    async fn fetch_registered_users(
        &self,
        circle: Address,
    ) -> Result<RegisteredUserSet, CircleReadError> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await?;
        self.users
            .lock()
            .unwrap()
            .get(&circle)
            .cloned()
            .ok_or_else(|| CircleReadError::decode_failed(format!("unknown circle {circle}")))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Snapshot of a running circle with sensible defaults
pub fn snapshot(address: Address, name: &str) -> CircleSnapshot {
    CircleSnapshot {
        address,
        name: name.to_string(),
        curr_round: 2,
        num_rounds: 10,
        installment_size: U256::from(100u64),
        num_users: 10,
        protocol_token_reward_per_installment: U256::ZERO,
        max_protocol_token_in_auction: U256::ZERO,
        time_per_round: 86_400,
        start_time: 1_700_000_000,
        next_round_to_pay: 2,
        round_deadline: u64::MAX,
    }
}

/// Build a reader over `source` with a 15 second refresh interval
pub fn reader_with(source: Arc<MockCircleSource>) -> Arc<CircleReader> {
    let config = CirclescanConfigBuilder::new()
        .refresh_interval(Duration::from_secs(15))
        .build();
    Arc::new(CircleReader::with_source(source, &config))
}
