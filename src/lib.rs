// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Read path for rotating savings circle contracts.
//!
//! circlescan reads circle contracts over JSON-RPC and keeps the results in
//! address-keyed caches so that many views of the same circle cost one set of
//! calls. Every request goes through a shared concurrency throttle, every
//! endpoint gets exactly one provider, and views poll through observers that
//! refresh every 15 seconds.
//!
//! # Modules
//!
//! - [`cache`] - address-keyed caches with case-insensitive keys
//! - [`transport`] - concurrency throttle and its Tower layer
//! - [`provider`] - one shared provider per endpoint URL
//! - [`circle`] - contract bindings and the snapshot and member fetchers
//! - [`registry`] - deployed-circle address list, HTTP routes and client
//!
//! # Example
//!
//! ```rust,ignore
//! use circlescan::{CircleReader, CirclescanConfig};
//! use std::sync::Arc;
//!
//! let config = CirclescanConfig::from_env()?;
//! let addresses = circlescan::load_circle_addresses(&config.circles_file).await?;
//! let reader = Arc::new(CircleReader::new(config)?);
//!
//! for row in reader.list_circles(&addresses).await {
//!     println!("{} {}/{}", row.contract.name, row.members, row.max_members);
//! }
//!
//! let observer = reader.observe_circle(&addresses[0]);
//! let state = observer.subscribe().wait_for(|s| s.data.is_some()).await?;
//! ```

pub mod bootstrap;
pub mod cache;
pub mod circle;
pub mod config;
pub mod errors;
pub mod observer;
pub mod provider;
mod reader;
pub mod registry;
mod spans;
pub mod transport;
pub mod types;

pub use cache::{AddressCache, CacheKey, CacheStats, CircleCache, RegisteredUsersCache};
pub use circle::{CircleSource, RpcCircleSource};
pub use config::{CirclescanConfig, CirclescanConfigBuilder, MembershipSource, ThrottleConfig};
pub use errors::{
    CircleReadError, CirclescanError, ConfigError, RegistryError, RpcError, SharedReadError,
};
pub use observer::{ObservedState, ObserverHandle, ObserverPhase};
pub use provider::{ConnectionPool, PooledProvider};
pub use reader::CircleReader;
pub use registry::{load_circle_addresses, registry_router, RegistryClient, RegistryState};
pub use transport::{RpcThrottle, ThrottleLayer};
pub use types::{CircleListItem, CircleSnapshot, RegisteredUserSet};
