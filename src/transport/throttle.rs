// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Concurrency throttle for RPC calls, usable directly or as a Tower layer.
//!
//! At most `max_concurrent` tasks run at once. Waiters are admitted in FIFO
//! order. A finished task does not free its slot immediately: the slot is
//! handed back after a fixed cooldown, which spreads bursts of calls out over
//! time and keeps hosted RPC providers from rate limiting the client.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tower::Layer;
use tracing::trace;

use crate::config::ThrottleConfig;

/// Bounded, FIFO concurrency gate with delayed slot release.
///
/// Clones share the same slots.
///
/// # Example
///
/// ```rust
/// use circlescan::transport::RpcThrottle;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let throttle = RpcThrottle::new(3, Duration::from_millis(200));
///
/// let value = throttle.run(async { 21 * 2 }).await;
/// assert_eq!(value, 42);
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct RpcThrottle {
    slots: Arc<Semaphore>,
    max_concurrent: usize,
    release_delay: Duration,
}

impl RpcThrottle {
    /// Creates a throttle admitting `max_concurrent` tasks at once.
    ///
    /// A `max_concurrent` of zero is treated as one.
    pub fn new(max_concurrent: usize, release_delay: Duration) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            slots: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            release_delay,
        }
    }

    /// Creates a throttle from configuration.
    pub fn from_config(config: &ThrottleConfig) -> Self {
        Self::new(config.max_concurrent, config.release_delay)
    }

    /// Runs `task` once a slot is free.
    ///
    /// The task's output, including any error, is returned unchanged. The
    /// slot is released `release_delay` after the task finishes, and also if
    /// the returned future is dropped midway.
    pub async fn run<F, T>(&self, task: F) -> T
    where
        F: Future<Output = T>,
    {
        let _slot = self.acquire().await;
        task.await
    }

    /// Waits for a slot and claims it.
    ///
    /// Dropping the returned [`ThrottleSlot`] schedules the release.
    pub async fn acquire(&self) -> ThrottleSlot {
        // The semaphore is never closed, so acquisition only fails if that
        // invariant is broken; in that case run unthrottled.
        let permit = self.slots.clone().acquire_owned().await.ok();
        trace!(available = self.available(), "Throttle slot acquired");
        ThrottleSlot {
            permit,
            release_delay: self.release_delay,
        }
    }

    /// Number of slots that can be claimed right now.
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    /// Configured concurrency cap.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Configured release cooldown.
    pub fn release_delay(&self) -> Duration {
        self.release_delay
    }
}

impl Default for RpcThrottle {
    fn default() -> Self {
        Self::from_config(&ThrottleConfig::default())
    }
}

/// A claimed throttle slot.
///
/// The slot goes back to the throttle `release_delay` after this guard is
/// dropped. Outside a Tokio runtime it is released immediately.
#[derive(Debug)]
pub struct ThrottleSlot {
    permit: Option<OwnedSemaphorePermit>,
    release_delay: Duration,
}

impl Drop for ThrottleSlot {
    fn drop(&mut self) {
        let Some(permit) = self.permit.take() else {
            return;
        };

        if self.release_delay.is_zero() {
            return;
        }

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let delay = self.release_delay;
            handle.spawn(async move {
                tokio::time::sleep(delay).await;
                drop(permit);
            });
        }
    }
}

/// A Tower layer that runs every request through an [`RpcThrottle`].
///
/// # Example
///
/// ```rust,ignore
/// use circlescan::transport::{RpcThrottle, ThrottleLayer};
/// use alloy_rpc_client::ClientBuilder;
/// use std::time::Duration;
///
/// let throttle = RpcThrottle::new(3, Duration::from_millis(200));
///
/// let client = ClientBuilder::default()
///     .layer(ThrottleLayer::new(throttle))
///     .http(rpc_url);
/// ```
#[derive(Clone, Debug)]
pub struct ThrottleLayer {
    throttle: RpcThrottle,
}

impl ThrottleLayer {
    /// Creates a layer sharing the slots of `throttle`.
    pub fn new(throttle: RpcThrottle) -> Self {
        Self { throttle }
    }
}

impl<S> Layer<S> for ThrottleLayer {
    type Service = ThrottleService<S>;

    fn layer(&self, service: S) -> Self::Service {
        ThrottleService {
            service,
            throttle: self.throttle.clone(),
        }
    }
}

/// A Tower service that admits requests through an [`RpcThrottle`].
#[derive(Clone, Debug)]
pub struct ThrottleService<S> {
    service: S,
    throttle: RpcThrottle,
}

impl<S, Request> tower::Service<Request> for ThrottleService<S>
where
    S: tower::Service<Request> + Clone + Send + 'static,
    S::Future: Send,
    Request: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let throttle = self.throttle.clone();
        let mut service = self.service.clone();

        Box::pin(async move {
            let _slot = throttle.acquire().await;
            service.call(request).await
        })
    }
}
