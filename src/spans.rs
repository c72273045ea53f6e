//! Span creation helpers for circlescan operations.
//!
//! Telemetry concerns are kept out of business logic: instead of
//! `#[instrument]` attributes, each instrumented operation has a matching
//! span helper here.
//!
//! Usage pattern:
//! ```rust,ignore
//! pub async fn my_operation(circle: Address) -> Result<T> {
//!     let span = spans::my_operation(circle);
//!     async move {
//!         // Business logic here
//!     }
//!     .instrument(span)
//!     .await
//! }
//! ```

use alloy_primitives::Address;
use tracing::{Level, Span};

/// Create span for reading a circle contract snapshot.
///
/// Parent: reader fetch or observer poll span
/// Children: the individual `eth_call` requests
#[inline]
pub(crate) fn fetch_circle_snapshot(circle: Address) -> Span {
    tracing::debug_span!("circlescan.fetch_circle_snapshot", circle = %circle)
}

/// Create span for discovering a circle's registered members.
///
/// `strategy` is either `"index"` or `"events"`.
#[inline]
pub(crate) fn fetch_registered_users(circle: Address, strategy: &'static str) -> Span {
    tracing::debug_span!(
        "circlescan.fetch_registered_users",
        circle = %circle,
        strategy = strategy,
    )
}

/// Create span for building the deployed-circle listing.
///
/// Parent: None (root span for this operation)
/// Children: fetch_circle_snapshot and fetch_registered_users spans
#[inline]
pub(crate) fn list_circles(count: usize) -> Span {
    tracing::span!(Level::INFO, "circlescan.list_circles", count = count)
}

/// Create span for a polling observer's lifetime.
///
/// Parent: None (the observer runs as its own task)
#[inline]
pub(crate) fn observe(address: &str, kind: &'static str) -> Span {
    tracing::span!(
        Level::INFO,
        "circlescan.observe",
        address = address,
        kind = kind,
    )
}
