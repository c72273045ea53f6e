// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Pluggable data source for circle reads

use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;

use super::{fetch_circle_snapshot, fetch_registered_users};
use crate::config::MembershipSource;
use crate::errors::CircleReadError;
use crate::provider::{ConnectionPool, PooledProvider};
use crate::types::{CircleSnapshot, RegisteredUserSet};

/// Where a [`CircleReader`](crate::CircleReader) gets uncached data from
///
/// The production implementation is [`RpcCircleSource`]. Tests substitute an
/// in-memory source to control timing and failures.
///
/// # Error Handling
///
/// Implementations return errors as-is; caching, deduplication and retry
/// policy belong to the reader and observers.
#[async_trait]
pub trait CircleSource: Send + Sync {
    /// Read a fresh snapshot of `circle`
    async fn fetch_snapshot(&self, circle: Address) -> Result<CircleSnapshot, CircleReadError>;

    /// Read the registered members of `circle`
    async fn fetch_registered_users(
        &self,
        circle: Address,
    ) -> Result<RegisteredUserSet, CircleReadError>;

    /// Returns a human-readable name for this source
    ///
    /// Used for logging and debugging.
    fn name(&self) -> &'static str;
}

/// Reads circles over JSON-RPC through a shared [`ConnectionPool`]
#[derive(Debug, Clone)]
pub struct RpcCircleSource {
    pool: Arc<ConnectionPool>,
    rpc_url: String,
    membership: MembershipSource,
}

impl RpcCircleSource {
    /// Create a source reading from `rpc_url`
    pub fn new(
        pool: Arc<ConnectionPool>,
        rpc_url: impl Into<String>,
        membership: MembershipSource,
    ) -> Self {
        Self {
            pool,
            rpc_url: rpc_url.into(),
            membership,
        }
    }

    /// The endpoint this source reads from
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    fn connection(&self) -> Result<PooledProvider, CircleReadError> {
        Ok(self.pool.get_connection(&self.rpc_url)?)
    }
}

#[async_trait]
impl CircleSource for RpcCircleSource {
    async fn fetch_snapshot(&self, circle: Address) -> Result<CircleSnapshot, CircleReadError> {
        let provider = self.connection()?;
        fetch_circle_snapshot(provider.as_ref(), circle).await
    }

    async fn fetch_registered_users(
        &self,
        circle: Address,
    ) -> Result<RegisteredUserSet, CircleReadError> {
        let provider = self.connection()?;
        fetch_registered_users(provider.as_ref(), circle, self.membership).await
    }

    fn name(&self) -> &'static str {
        "rpc"
    }
}
