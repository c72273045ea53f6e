// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Configuration errors.
//!
//! These are never retried: a reader without an RPC endpoint stays broken
//! until it is reconfigured.

/// Errors raised while resolving [`CirclescanConfig`](crate::CirclescanConfig).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Neither an RPC URL nor an API key to derive one was configured.
    #[error("Missing RPC URL: set RPC_URL or ALCHEMY_API_KEY")]
    MissingRpcUrl,

    /// An API key was given for a chain with no known hosted endpoint.
    #[error("No hosted RPC endpoint known for chain {chain}")]
    UnsupportedChain {
        /// Display name of the chain
        chain: String,
    },

    /// A configuration value could not be parsed.
    #[error("Invalid value for {field}: {details}")]
    InvalidValue {
        /// Name of the offending field or environment variable
        field: String,
        /// Why the value was rejected
        details: String,
    },
}

impl ConfigError {
    /// Create an `InvalidValue` error for a specific field.
    pub fn invalid_value(field: impl Into<String>, details: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            details: details.into(),
        }
    }
}
