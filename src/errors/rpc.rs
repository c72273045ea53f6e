//! Shared RPC error types for circle contract reads.
//!
//! This module provides error types for the RPC failures that can occur
//! when reading circle contracts through a pooled provider.

/// Errors that can occur during blockchain RPC operations.
///
/// Every variant that wraps a provider failure records which operation was
/// being performed, so a failed `currRound()` read is distinguishable from a
/// failed log replay in the logs.
///
/// # Examples
///
/// ```rust
/// use circlescan::RpcError;
///
/// let error = RpcError::ProviderUrlInvalid("not a url".to_string());
/// println!("Error: {}", error);
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The endpoint URL could not be parsed.
    #[error("Invalid provider URL: {0}")]
    ProviderUrlInvalid(String),

    /// A read-only contract call failed.
    ///
    /// This covers reverts, decode failures and transport errors surfaced
    /// by the contract call builder.
    #[error("Contract call {operation} failed")]
    ContractCallFailed {
        /// The contract function that was called (e.g., "currRound")
        operation: String,
        /// The underlying contract error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to fetch logs from the blockchain.
    ///
    /// This can occur due to rate limiting, invalid block ranges, network
    /// connectivity issues, or provider-side errors.
    #[error("Failed to fetch logs for {operation}")]
    GetLogsFailed {
        /// Description of the operation that failed (e.g., "UserRegistered 0-5000")
        operation: String,
        /// The underlying provider error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to fetch block number from the blockchain.
    ///
    /// This typically indicates a connectivity issue or provider problem.
    #[error("Failed to get current block number")]
    GetBlockNumberFailed {
        /// The underlying provider error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The provider pool could not hand out a connection.
    #[error("Provider pool unavailable: {0}")]
    PoolUnavailable(String),
}

impl RpcError {
    /// Helper to create a `ContractCallFailed` error from any error type.
    pub fn contract_call_failed(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::ContractCallFailed {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Helper to create a `GetLogsFailed` error from any error type.
    pub fn get_logs_failed(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::GetLogsFailed {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Helper to create a `GetBlockNumberFailed` error from any error type.
    pub fn get_block_number_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        RpcError::GetBlockNumberFailed {
            source: Box::new(source),
        }
    }
}
