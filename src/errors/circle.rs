// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for circle reads.
//!
//! This module provides the error type returned by snapshot and member-list
//! fetches, whether they run directly against a provider or through the
//! caching [`CircleReader`](crate::CircleReader).

use super::{ConfigError, RpcError};

/// Errors that can occur while reading a circle contract.
///
/// # Examples
///
/// ```rust,ignore
/// use circlescan::{CircleReadError, CircleReader};
///
/// match reader.fetch_circle_snapshot("0x1234...").await {
///     Ok(snapshot) => println!("round {} of {}", snapshot.curr_round, snapshot.num_rounds),
///     Err(e) => match e.as_ref() {
///         CircleReadError::InvalidAddress { address } => eprintln!("bad address {address}"),
///         CircleReadError::Rpc(rpc) => eprintln!("transient failure: {rpc}"),
///         other => eprintln!("{other}"),
///     },
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum CircleReadError {
    /// The input string is not a 20-byte hex address.
    #[error("Invalid circle address: {address}")]
    InvalidAddress {
        /// The rejected input
        address: String,
    },

    /// The reader has no usable RPC endpoint.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// RPC error when communicating with the blockchain provider.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// A registration log did not decode as `UserRegistered`.
    #[error("Failed to decode event: {details}")]
    DecodeFailed {
        /// Details about why the decode failed
        details: String,
    },

    /// The background task running the fetch ended without a result.
    #[error("Fetch task failed: {details}")]
    TaskFailed {
        /// Details reported by the runtime
        details: String,
    },
}

impl CircleReadError {
    /// Create an `InvalidAddress` error for the rejected input.
    pub fn invalid_address(address: impl Into<String>) -> Self {
        CircleReadError::InvalidAddress {
            address: address.into(),
        }
    }

    /// Create a `DecodeFailed` error with details.
    pub fn decode_failed(details: impl Into<String>) -> Self {
        CircleReadError::DecodeFailed {
            details: details.into(),
        }
    }

    /// Create a `TaskFailed` error with details.
    pub fn task_failed(details: impl Into<String>) -> Self {
        CircleReadError::TaskFailed {
            details: details.into(),
        }
    }

    /// Whether retrying on the next poll tick can succeed.
    ///
    /// Configuration and address errors are permanent; everything else is
    /// treated as transient.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Rpc(_) | Self::DecodeFailed { .. } | Self::TaskFailed { .. }
        )
    }
}
