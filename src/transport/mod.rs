// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transport layer utilities for Alloy providers.
//!
//! This module provides the concurrency throttle that every circle read goes
//! through, both as a plain async gate and as a Tower layer for Alloy's RPC
//! client.
//!
//! # Throttling
//!
//! [`RpcThrottle`] admits at most N calls at once (3 by default) and returns
//! a slot to the pool only after a cooldown (200ms by default).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use circlescan::transport::{RpcThrottle, ThrottleLayer};
//! use alloy_rpc_client::ClientBuilder;
//! use alloy_provider::ProviderBuilder;
//!
//! let throttle = RpcThrottle::default();
//!
//! // Throttle every JSON-RPC request issued by this client
//! let client = ClientBuilder::default()
//!     .layer(ThrottleLayer::new(throttle.clone()))
//!     .http(rpc_url);
//!
//! let provider = ProviderBuilder::new().connect_client(client);
//!
//! // Or gate an arbitrary task
//! let block = throttle.run(provider.get_block_number()).await?;
//! ```

mod throttle;

pub use throttle::{RpcThrottle, ThrottleLayer, ThrottleService, ThrottleSlot};
