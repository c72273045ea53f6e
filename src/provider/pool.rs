// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Shared provider connections keyed by endpoint URL
//!
//! The [`ConnectionPool`] hands out at most one provider per distinct URL for
//! its whole lifetime. Every view that reads from the same endpoint reuses the
//! same handle, so there is exactly one background polling loop and one
//! HTTP connection pool per endpoint.
//!
//! # Examples
//!
//! ```rust,ignore
//! use circlescan::provider::ConnectionPool;
//! use circlescan::transport::RpcThrottle;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let pool = ConnectionPool::new(RpcThrottle::default(), Duration::from_secs(30));
//!
//! let a = pool.get_connection("https://rpc.sepolia.org")?;
//! let b = pool.get_connection("https://rpc.sepolia.org")?;
//! assert!(Arc::ptr_eq(&a, &b));
//!
//! let block = a.get_block_number().await?;
//! ```

use alloy_network::Ethereum;
use alloy_provider::{ProviderBuilder, RootProvider};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::errors::RpcError;
use crate::transport::{RpcThrottle, ThrottleLayer};

/// Type alias for a pooled provider
pub type PooledProvider = Arc<RootProvider<Ethereum>>;

/// A thread-safe pool of providers indexed by endpoint URL
///
/// The pool uses a read-write lock for efficient concurrent access:
/// - Multiple readers can look up providers simultaneously
/// - Insertion re-checks under the write lock, so concurrent first requests
///   for one URL still produce a single handle
///
/// All providers created by one pool share its [`RpcThrottle`], which bounds
/// the total number of in-flight JSON-RPC requests across every endpoint.
#[derive(Debug)]
pub struct ConnectionPool {
    /// Map of endpoint URL to provider
    providers: RwLock<HashMap<String, PooledProvider>>,
    /// Throttle layered under every provider
    throttle: RpcThrottle,
    /// Background polling interval for new providers
    poll_interval: Duration,
}

impl ConnectionPool {
    /// Create an empty pool
    #[must_use]
    pub fn new(throttle: RpcThrottle, poll_interval: Duration) -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
            throttle,
            poll_interval,
        }
    }

    /// Get the provider for `url`, creating it on first use
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid and a provider needs to be created
    pub fn get_connection(&self, url: &str) -> Result<PooledProvider, RpcError> {
        // Try read lock first for better concurrency
        if let Some(provider) = self.get(url) {
            return Ok(provider);
        }

        let provider = Arc::new(create_pooled_provider(
            url,
            &self.throttle,
            self.poll_interval,
        )?);

        let mut providers = self
            .providers
            .write()
            .map_err(|_| RpcError::PoolUnavailable("Provider pool lock poisoned".to_string()))?;

        // Another caller may have inserted while we were building ours
        if let Some(existing) = providers.get(url) {
            debug!(url = url, "Provider created concurrently, reusing existing handle");
            return Ok(existing.clone());
        }

        info!(url = url, "Added provider to pool");
        providers.insert(url.to_string(), provider.clone());
        Ok(provider)
    }

    /// Get the provider for `url` if one exists
    #[must_use]
    pub fn get(&self, url: &str) -> Option<PooledProvider> {
        self.providers
            .read()
            .ok()
            .and_then(|providers| providers.get(url).cloned())
    }

    /// Check if a provider exists for `url`
    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.providers
            .read()
            .ok()
            .is_some_and(|providers| providers.contains_key(url))
    }

    /// Get the number of providers in the pool
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers
            .read()
            .map(|providers| providers.len())
            .unwrap_or(0)
    }

    /// Check if the pool is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The throttle shared by every provider in this pool
    #[must_use]
    pub fn throttle(&self) -> &RpcThrottle {
        &self.throttle
    }

    /// Drop every provider from the pool
    ///
    /// Handles already given out stay usable; the next
    /// [`get_connection`](Self::get_connection) builds a fresh one.
    pub fn clear(&self) {
        if let Ok(mut providers) = self.providers.write() {
            providers.clear();
            info!("Cleared all providers from pool");
        }
    }
}

/// Create a throttled provider for `url`
///
/// Returns a bare `RootProvider` without fillers; every read in this crate is
/// an `eth_call`, `eth_blockNumber` or `eth_getLogs`.
fn create_pooled_provider(
    url: &str,
    throttle: &RpcThrottle,
    poll_interval: Duration,
) -> Result<RootProvider<Ethereum>, RpcError> {
    let parsed_url: url::Url = url.parse().map_err(|e| {
        warn!(url = url, error = ?e, "Invalid provider URL");
        RpcError::ProviderUrlInvalid(url.to_string())
    })?;

    let client = alloy_rpc_client::ClientBuilder::default()
        .layer(ThrottleLayer::new(throttle.clone()))
        .http(parsed_url)
        .with_poll_interval(poll_interval);

    let provider = ProviderBuilder::new()
        .disable_recommended_fillers()
        .network::<Ethereum>()
        .connect_client(client);

    Ok(provider)
}
