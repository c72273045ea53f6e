//! Error types for the circlescan library.
//!
//! This module provides strongly-typed errors for all public APIs in circlescan.
//! It follows a hybrid approach:
//!
//! - **Module-specific errors** for fine-grained error handling (`ConfigError`,
//!   `CircleReadError`, `RegistryError`)
//! - **Unified error type** (`CirclescanError`) for convenience when you don't need
//!   to distinguish between error sources
//!
//! # Architecture
//!
//! - [`ConfigError`] - Missing or invalid configuration, never retried
//! - [`CircleReadError`] - Errors from snapshot and member-list reads
//! - [`RegistryError`] - Errors from loading the deployed-circle address list
//!
//! Additionally, [`RpcError`] provides shared error variants for blockchain RPC operations.
//!
//! # Example
//!
//! ```rust,ignore
//! use circlescan::{CirclescanConfig, CirclescanError, CircleReader};
//!
//! async fn example() -> Result<(), CirclescanError> {
//!     let reader = CircleReader::new(CirclescanConfig::from_env()?)?;
//!     let addresses = circlescan::load_circle_addresses("circles/deployed.txt").await?;
//!     let circles = reader.list_circles(&addresses).await;
//!     println!("{} circles", circles.len());
//!     Ok(())
//! }
//! ```

mod circle;
mod config;
mod registry;
mod rpc;

use std::sync::Arc;

pub use circle::CircleReadError;
pub use config::ConfigError;
pub use registry::RegistryError;
pub use rpc::RpcError;

/// Error shared between every caller awaiting the same in-flight fetch.
pub type SharedReadError = Arc<CircleReadError>;

/// Unified error type for all circlescan operations.
///
/// All module-specific error types automatically convert to `CirclescanError` via
/// `From` implementations, so you can use `?` to propagate errors naturally.
#[derive(Debug, thiserror::Error)]
pub enum CirclescanError {
    /// Error from configuration resolution.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from a circle read.
    #[error("Circle read error: {0}")]
    Read(#[from] SharedReadError),

    /// Error from the deployed-circle registry.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Error from the RPC layer outside a circle read.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),
}

impl From<CircleReadError> for CirclescanError {
    fn from(error: CircleReadError) -> Self {
        CirclescanError::Read(Arc::new(error))
    }
}
