// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Cached, deduplicated circle reads
//!
//! [`CircleReader`] is the entry point for every view of a circle. It owns the
//! two address-keyed caches, the shared connection pool and the map of fetches
//! currently in flight. Concurrent requests for the same address share one
//! underlying fetch; a successful fetch replaces the cached value, a failed one
//! leaves it untouched.
//!
//! # Example
//!
//! ```rust,ignore
//! use circlescan::{CircleReader, CirclescanConfig};
//! use std::sync::Arc;
//!
//! let reader = Arc::new(CircleReader::new(CirclescanConfig::from_env()?)?);
//!
//! // Served from cache when possible
//! let snapshot = reader.circle_snapshot("0xAbC...").await?;
//!
//! // Always hits the chain, shared with any concurrent caller
//! let fresh = reader.fetch_circle_snapshot("0xabc...").await?;
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use alloy_primitives::Address;
use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use tracing::{debug, info, warn, Instrument};

use crate::cache::{AddressCache, CacheKey, CircleCache, RegisteredUsersCache};
use crate::circle::{CircleSource, RpcCircleSource};
use crate::config::CirclescanConfig;
use crate::errors::{CircleReadError, ConfigError, SharedReadError};
use crate::provider::ConnectionPool;
use crate::spans;
use crate::transport::RpcThrottle;
use crate::types::{CircleListItem, CircleSnapshot, RegisteredUserSet};

type SharedFetch<T> = Shared<BoxFuture<'static, Result<T, SharedReadError>>>;

/// Fetches in flight for one kind of value, keyed by normalized address
///
/// Each entry carries a generation number so a fetch only ever removes its own
/// entry, even after the map has been cleared and repopulated. The epoch moves
/// on every [`clear`](Self::clear); a fetch started in an earlier epoch still
/// answers its waiters but never writes the cache.
struct InFlight<T> {
    fetches: Mutex<HashMap<CacheKey, (u64, SharedFetch<T>)>>,
    generation: AtomicU64,
    epoch: AtomicU64,
}

impl<T> InFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn new() -> Self {
        Self {
            fetches: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
        }
    }

    /// Join the fetch in flight for `key`, or spawn one with `fetch`
    ///
    /// A successful result is written to `cache` before any waiter observes it,
    /// unless the map was cleared in the meantime. Must be called from within a
    /// Tokio runtime.
    fn join_or_start<F, Fut>(
        this: &Arc<Self>,
        cache: &Arc<AddressCache<T>>,
        key: CacheKey,
        fetch: F,
    ) -> SharedFetch<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CircleReadError>> + Send + 'static,
    {
        let mut fetches = this.fetches.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some((_, existing)) = fetches.get(&key) {
            debug!(address = %key, "Joining in-flight fetch");
            return existing.clone();
        }

        let generation = this.generation.fetch_add(1, Ordering::Relaxed);
        let epoch = this.epoch.load(Ordering::Relaxed);
        let pending = fetch();
        let inflight = Arc::clone(this);
        let cache = Arc::clone(cache);
        let entry_key = key.clone();

        // Driven to completion even when every waiter is dropped
        let task = tokio::spawn(async move {
            let result = pending.await;
            inflight.finish(&entry_key, generation, epoch, &result, &cache);
            result
        });

        let shared = async move {
            match task.await {
                Ok(result) => result.map_err(Arc::new),
                Err(e) => Err(Arc::new(CircleReadError::task_failed(e.to_string()))),
            }
        }
        .boxed()
        .shared();

        fetches.insert(key, (generation, shared.clone()));
        shared
    }

    /// Publish a finished fetch and drop its entry
    ///
    /// Runs under the map lock so it cannot interleave with `clear`.
    fn finish(
        &self,
        key: &CacheKey,
        generation: u64,
        epoch: u64,
        result: &Result<T, CircleReadError>,
        cache: &AddressCache<T>,
    ) {
        let mut fetches = self.fetches.lock().unwrap_or_else(PoisonError::into_inner);

        if let Ok(value) = result {
            if self.epoch.load(Ordering::Relaxed) == epoch {
                cache.set(key.clone(), value.clone());
            } else {
                debug!(address = %key, "Discarding fetch started before clear");
            }
        }
        if fetches.get(key).is_some_and(|(g, _)| *g == generation) {
            fetches.remove(key);
        }
    }

    fn len(&self) -> usize {
        self.fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn clear(&self) {
        let mut fetches = self.fetches.lock().unwrap_or_else(PoisonError::into_inner);
        self.epoch.fetch_add(1, Ordering::Relaxed);
        fetches.clear();
    }
}

/// Cached reader for circle snapshots and member lists
///
/// Construct one per process and share it behind an [`Arc`]; observers hold
/// a clone of that `Arc` for as long as they poll.
pub struct CircleReader {
    source: Arc<dyn CircleSource>,
    circles: Arc<CircleCache>,
    users: Arc<RegisteredUsersCache>,
    snapshot_fetches: Arc<InFlight<CircleSnapshot>>,
    user_fetches: Arc<InFlight<RegisteredUserSet>>,
    pool: Option<Arc<ConnectionPool>>,
    refresh_interval: Duration,
}

impl std::fmt::Debug for CircleReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircleReader")
            .field("source", &self.source.name())
            .field("circles", &self.circles.len())
            .field("users", &self.users.len())
            .field("refresh_interval", &self.refresh_interval)
            .finish()
    }
}

impl CircleReader {
    /// Create a reader that talks JSON-RPC to the configured endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if no endpoint can be derived from `config`.
    pub fn new(config: CirclescanConfig) -> Result<Self, ConfigError> {
        let rpc_url = config.resolve_rpc_url()?;
        let throttle = RpcThrottle::from_config(&config.throttle);
        let pool = Arc::new(ConnectionPool::new(throttle, config.provider_poll_interval));
        let source = RpcCircleSource::new(Arc::clone(&pool), rpc_url, config.membership);

        info!(
            chain = %config.chain,
            max_concurrent = config.throttle.max_concurrent,
            release_delay_ms = config.throttle.release_delay.as_millis() as u64,
            "Circle reader ready"
        );

        let mut reader = Self::with_source(Arc::new(source), &config);
        reader.pool = Some(pool);
        Ok(reader)
    }

    /// Create a reader over an arbitrary [`CircleSource`]
    pub fn with_source(source: Arc<dyn CircleSource>, config: &CirclescanConfig) -> Self {
        Self {
            source,
            circles: Arc::new(AddressCache::new("circles")),
            users: Arc::new(AddressCache::new("registered_users")),
            snapshot_fetches: Arc::new(InFlight::new()),
            user_fetches: Arc::new(InFlight::new()),
            pool: None,
            refresh_interval: config.refresh_interval,
        }
    }

    /// Last known snapshot of `address`, if any
    pub fn cached_snapshot(&self, address: &str) -> Option<CircleSnapshot> {
        self.circles.get(address)
    }

    /// Last known member list of `address`, if any
    pub fn cached_registered_users(&self, address: &str) -> Option<RegisteredUserSet> {
        self.users.get(address)
    }

    /// Read a fresh snapshot of `address`
    ///
    /// Joins a fetch already in flight for the same address instead of
    /// starting a second one.
    ///
    /// # Errors
    ///
    /// Returns an error if `address` is malformed or the read fails. On
    /// failure the cached snapshot is left as it was.
    pub async fn fetch_circle_snapshot(
        &self,
        address: &str,
    ) -> Result<CircleSnapshot, SharedReadError> {
        let circle = parse_circle(address)?;
        let source = Arc::clone(&self.source);
        InFlight::join_or_start(
            &self.snapshot_fetches,
            &self.circles,
            CacheKey::from(circle),
            move || async move { source.fetch_snapshot(circle).await },
        )
        .await
    }

    /// Cached snapshot of `address`, fetching it on a miss
    ///
    /// # Errors
    ///
    /// Same as [`fetch_circle_snapshot`](Self::fetch_circle_snapshot).
    pub async fn circle_snapshot(&self, address: &str) -> Result<CircleSnapshot, SharedReadError> {
        match self.cached_snapshot(address) {
            Some(snapshot) => Ok(snapshot),
            None => self.fetch_circle_snapshot(address).await,
        }
    }

    /// Read a fresh member list of `address`
    ///
    /// # Errors
    ///
    /// Returns an error if `address` is malformed or the read fails. On
    /// failure the cached list is left as it was.
    pub async fn fetch_registered_users(
        &self,
        address: &str,
    ) -> Result<RegisteredUserSet, SharedReadError> {
        let circle = parse_circle(address)?;
        let source = Arc::clone(&self.source);
        InFlight::join_or_start(
            &self.user_fetches,
            &self.users,
            CacheKey::from(circle),
            move || async move { source.fetch_registered_users(circle).await },
        )
        .await
    }

    /// Cached member list of `address`, fetching it on a miss
    ///
    /// # Errors
    ///
    /// Same as [`fetch_registered_users`](Self::fetch_registered_users).
    pub async fn registered_users(
        &self,
        address: &str,
    ) -> Result<RegisteredUserSet, SharedReadError> {
        match self.cached_registered_users(address) {
            Some(users) => Ok(users),
            None => self.fetch_registered_users(address).await,
        }
    }

    /// Drop cached data for one address, or for every address with `None`
    pub fn invalidate(&self, address: Option<&str>) {
        self.circles.clear(address);
        self.users.clear(address);
    }

    /// Build listing rows for `addresses`, sorted by circle name
    ///
    /// Every address is read fresh. Addresses whose snapshot or member list
    /// cannot be read are logged and left out.
    pub async fn list_circles<S>(&self, addresses: &[S]) -> Vec<CircleListItem>
    where
        S: AsRef<str>,
    {
        let span = spans::list_circles(addresses.len());

        async move {
            let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();

            let rows = join_all(addresses.iter().map(|address| async move {
                let address = address.as_ref();
                let outcome = async {
                    let snapshot = self.fetch_circle_snapshot(address).await?;
                    let users = self.fetch_registered_users(address).await?;
                    Ok::<_, SharedReadError>(CircleListItem::new(snapshot, &users, now))
                }
                .await;

                outcome
                    .map_err(|error| {
                        warn!(address = address, error = %error, "Skipping unreadable circle");
                    })
                    .ok()
            }))
            .await;

            let mut circles: Vec<CircleListItem> = rows.into_iter().flatten().collect();
            circles.sort_by(|a, b| a.contract.name.cmp(&b.contract.name));

            info!(
                requested = addresses.len(),
                listed = circles.len(),
                "Built circle listing"
            );
            circles
        }
        .instrument(span)
        .await
    }

    /// Release everything the reader holds
    ///
    /// Forgets in-flight fetches, clears both caches and empties the
    /// connection pool. Callers already awaiting a fetch still receive its
    /// result, but that result is not cached.
    pub fn dispose(&self) {
        self.snapshot_fetches.clear();
        self.user_fetches.clear();
        self.invalidate(None);
        if let Some(pool) = &self.pool {
            pool.clear();
        }
        info!("Circle reader disposed");
    }

    /// Snapshot cache
    pub fn circle_cache(&self) -> &CircleCache {
        &self.circles
    }

    /// Member-list cache
    pub fn users_cache(&self) -> &RegisteredUsersCache {
        &self.users
    }

    /// Connection pool, when reading over JSON-RPC
    pub fn pool(&self) -> Option<&Arc<ConnectionPool>> {
        self.pool.as_ref()
    }

    /// Interval between observer refreshes
    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Number of fetches currently in flight, snapshots and member lists combined
    pub fn in_flight(&self) -> usize {
        self.snapshot_fetches.len() + self.user_fetches.len()
    }

    /// Name of the underlying data source
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }
}

fn parse_circle(address: &str) -> Result<Address, CircleReadError> {
    address
        .trim()
        .parse::<Address>()
        .map_err(|_| CircleReadError::invalid_address(address))
}
