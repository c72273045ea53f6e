// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Polling observers over cached circle reads
//!
//! An observer fetches once immediately and then every refresh interval,
//! publishing an [`ObservedState`] through a [`tokio::sync::watch`] channel.
//! It starts from whatever the cache already holds, so a view that mounts
//! after another one has loaded the same circle shows data right away.
//!
//! Stopping an observer, explicitly or by dropping its handle, guarantees no
//! further state is published, even if a fetch it started resolves later.
//!
//! ```rust,ignore
//! let reader = Arc::new(CircleReader::new(config)?);
//! let observer = reader.observe_circle("0xabc...");
//!
//! let mut rx = observer.subscribe();
//! let ready = rx.wait_for(|state| state.data.is_some()).await?;
//! println!("round {}", ready.data.as_ref().map_or(0, |s| s.curr_round));
//!
//! observer.stop();
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn, Instrument};

use crate::errors::SharedReadError;
use crate::reader::CircleReader;
use crate::spans;
use crate::types::{CircleListItem, CircleSnapshot, RegisteredUserSet};

/// Where an observer is in its fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObserverPhase {
    /// Created, nothing requested yet
    Idle,
    /// First fetch in progress
    Loading,
    /// Last fetch succeeded
    Ready,
    /// Periodic refresh in progress; previous data stays visible
    Refreshing,
    /// Last fetch failed; previous data, if any, stays visible
    Error,
}

/// What a view renders: data, a loading flag and the last error
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedState<T> {
    /// Most recent successfully fetched value
    pub data: Option<T>,
    /// Set only while the first fetch is in progress
    pub loading: bool,
    /// Message of the most recent failed fetch
    pub error: Option<String>,
    /// Current phase
    pub phase: ObserverPhase,
}

impl<T> ObservedState<T> {
    fn idle(data: Option<T>) -> Self {
        Self {
            data,
            loading: false,
            error: None,
            phase: ObserverPhase::Idle,
        }
    }

    fn begin_load(&mut self) {
        self.loading = true;
        self.error = None;
        self.phase = ObserverPhase::Loading;
    }

    fn begin_refresh(&mut self) {
        self.error = None;
        self.phase = ObserverPhase::Refreshing;
    }

    fn succeed(&mut self, value: T) {
        self.data = Some(value);
        self.loading = false;
        self.error = None;
        self.phase = ObserverPhase::Ready;
    }

    fn fail(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
        self.phase = ObserverPhase::Error;
    }
}

impl<T> Default for ObservedState<T> {
    fn default() -> Self {
        Self::idle(None)
    }
}

/// Handle to a running observer
///
/// Dropping the handle stops the observer.
#[derive(Debug)]
pub struct ObserverHandle<T> {
    state: watch::Receiver<ObservedState<T>>,
    stopped: Arc<Mutex<bool>>,
    task: JoinHandle<()>,
}

impl<T> ObserverHandle<T> {
    /// Current state
    pub fn state(&self) -> ObservedState<T>
    where
        T: Clone,
    {
        self.state.borrow().clone()
    }

    /// A receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<ObservedState<T>> {
        self.state.clone()
    }

    /// Stop polling
    ///
    /// Idempotent. Once this returns, no further state is published.
    pub fn stop(&self) {
        let mut stopped = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        if !*stopped {
            *stopped = true;
            self.task.abort();
            debug!("Observer stopped");
        }
    }

    /// Whether [`stop`](Self::stop) has been called
    pub fn is_stopped(&self) -> bool {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Drop for ObserverHandle<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Publishes through `tx` unless the observer has been stopped
///
/// The stop flag is held across the update so a concurrent `stop` either
/// happens before (nothing published) or after (update already visible).
struct Publisher<T> {
    tx: watch::Sender<ObservedState<T>>,
    stopped: Arc<Mutex<bool>>,
}

impl<T> Publisher<T> {
    /// Returns `false` once the observer is stopped
    fn publish(&self, update: impl FnOnce(&mut ObservedState<T>)) -> bool {
        let stopped = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        if *stopped {
            return false;
        }
        self.tx.send_modify(update);
        true
    }
}

/// Spawn a polling task calling `fetch` every `interval`
///
/// Must be called from within a Tokio runtime.
pub(crate) fn spawn_observer<T, F, Fut>(
    address: &str,
    kind: &'static str,
    interval: Duration,
    initial: Option<T>,
    fetch: F,
) -> ObserverHandle<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, SharedReadError>> + Send,
{
    let (tx, rx) = watch::channel(ObservedState::idle(initial));
    let stopped = Arc::new(Mutex::new(false));
    let publisher = Publisher {
        tx,
        stopped: Arc::clone(&stopped),
    };
    let span = spans::observe(address, kind);
    // tokio's interval panics on a zero period
    let period = interval.max(Duration::from_millis(1));

    let task = tokio::spawn(
        async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            if !publisher.publish(ObservedState::begin_load) {
                return;
            }

            loop {
                let result = fetch().await;

                let published = match result {
                    Ok(value) => publisher.publish(|state| state.succeed(value)),
                    Err(error) => {
                        warn!(error = %error, "Observer fetch failed");
                        let message = error.to_string();
                        publisher.publish(|state| state.fail(message))
                    }
                };
                if !published {
                    return;
                }

                ticker.tick().await;

                if !publisher.publish(ObservedState::begin_refresh) {
                    return;
                }
            }
        }
        .instrument(span),
    );

    ObserverHandle {
        state: rx,
        stopped,
        task,
    }
}

impl CircleReader {
    /// Poll the snapshot of `address` every refresh interval
    ///
    /// Must be called from within a Tokio runtime. The observer keeps the
    /// reader alive until it is stopped.
    pub fn observe_circle(self: &Arc<Self>, address: &str) -> ObserverHandle<CircleSnapshot> {
        let reader = Arc::clone(self);
        let target = address.to_string();

        spawn_observer(
            address,
            "snapshot",
            self.refresh_interval(),
            self.cached_snapshot(address),
            move || {
                let reader = Arc::clone(&reader);
                let target = target.clone();
                async move { reader.fetch_circle_snapshot(&target).await }
            },
        )
    }

    /// Poll the member list of `address` every refresh interval
    ///
    /// Must be called from within a Tokio runtime.
    pub fn observe_registered_users(
        self: &Arc<Self>,
        address: &str,
    ) -> ObserverHandle<RegisteredUserSet> {
        let reader = Arc::clone(self);
        let target = address.to_string();

        spawn_observer(
            address,
            "registered_users",
            self.refresh_interval(),
            self.cached_registered_users(address),
            move || {
                let reader = Arc::clone(&reader);
                let target = target.clone();
                async move { reader.fetch_registered_users(&target).await }
            },
        )
    }

    /// Poll the listing of `addresses` every refresh interval
    ///
    /// Each poll rebuilds the whole listing with
    /// [`list_circles`](Self::list_circles), so unreadable circles are left
    /// out rather than failing the poll. The previous listing stays visible
    /// while a refresh runs.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn observe_circles(
        self: &Arc<Self>,
        addresses: Vec<String>,
    ) -> ObserverHandle<Vec<CircleListItem>> {
        let reader = Arc::clone(self);
        let addresses = Arc::new(addresses);

        spawn_observer(
            "listing",
            "circles",
            self.refresh_interval(),
            None,
            move || {
                let reader = Arc::clone(&reader);
                let addresses = Arc::clone(&addresses);
                async move {
                    let circles = reader.list_circles(addresses.as_slice()).await;
                    Ok::<_, SharedReadError>(circles)
                }
            },
        )
    }
}
