//! Configuration for circlescan operations
//!
//! This module provides the configuration that controls where circle contracts
//! are read from, how hard the RPC endpoint is hit, and how often observers
//! refresh.
//!
//! # Example: Using defaults
//!
//! ```rust
//! use circlescan::CirclescanConfig;
//!
//! // 3 concurrent calls, 200ms release cooldown, 15s refresh
//! let config = CirclescanConfig::default();
//! assert_eq!(config.throttle.max_concurrent, 3);
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use circlescan::{CirclescanConfigBuilder, MembershipSource};
//! use std::time::Duration;
//!
//! let config = CirclescanConfigBuilder::new()
//!     .rpc_url("https://rpc.sepolia.org")
//!     .max_concurrent(5)
//!     .release_delay(Duration::from_millis(100))
//!     .membership(MembershipSource::EventLog { chunk_size: Some(5_000) })
//!     .build();
//! ```
//!
//! # Example: From the environment
//!
//! ```rust,ignore
//! use circlescan::CirclescanConfig;
//!
//! // Reads RPC_URL, ALCHEMY_API_KEY, CIRCLES_FILE, ... (after loading .env)
//! let config = CirclescanConfig::from_env()?;
//! let url = config.resolve_rpc_url()?;
//! ```

use std::path::PathBuf;
use std::time::Duration;

use alloy_chains::NamedChain;

use crate::errors::ConfigError;

pub mod constants;

use constants::{
    DEFAULT_CIRCLES_FILE, DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_MAX_USERS,
    DEFAULT_PROVIDER_POLL_INTERVAL, DEFAULT_REFRESH_INTERVAL, DEFAULT_RELEASE_DELAY,
};

/// Configuration for circlescan operations
///
/// Use [`CirclescanConfigBuilder`] for a fluent API to construct instances.
#[derive(Debug, Clone)]
pub struct CirclescanConfig {
    /// Explicit JSON-RPC endpoint. Takes precedence over `alchemy_api_key`.
    pub rpc_url: Option<String>,

    /// API key used to derive a hosted endpoint for `chain`
    pub alchemy_api_key: Option<String>,

    /// Chain the circle contracts are deployed on
    /// Default: Sepolia
    pub chain: NamedChain,

    /// Concurrency throttle applied to every RPC request
    pub throttle: ThrottleConfig,

    /// Background polling interval of pooled provider handles
    /// Default: 30 seconds
    pub provider_poll_interval: Duration,

    /// Observer refresh interval
    /// Default: 15 seconds
    pub refresh_interval: Duration,

    /// How registered members are discovered
    pub membership: MembershipSource,

    /// Newline-delimited list of deployed circle addresses
    pub circles_file: PathBuf,
}

/// Limits of the RPC concurrency throttle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleConfig {
    /// Maximum number of calls in flight at once
    pub max_concurrent: usize,

    /// Cooldown after completion before a slot is reusable
    pub release_delay: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT_REQUESTS,
            release_delay: DEFAULT_RELEASE_DELAY,
        }
    }
}

/// Strategy for deriving a circle's registered-member list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipSource {
    /// Read `registeredUsers(i)` for every index below `min(numUsers, max_users)`
    IndexScan {
        /// Upper bound on the number of index reads
        max_users: u64,
    },
    /// Replay `UserRegistered` logs from genesis to the latest block
    EventLog {
        /// Blocks per `eth_getLogs` call; `None` queries the whole range at once
        chunk_size: Option<u64>,
    },
}

impl Default for MembershipSource {
    fn default() -> Self {
        Self::IndexScan {
            max_users: DEFAULT_MAX_USERS,
        }
    }
}

impl Default for CirclescanConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            alchemy_api_key: None,
            chain: NamedChain::Sepolia,
            throttle: ThrottleConfig::default(),
            provider_poll_interval: DEFAULT_PROVIDER_POLL_INTERVAL,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            membership: MembershipSource::default(),
            circles_file: PathBuf::from(DEFAULT_CIRCLES_FILE),
        }
    }
}

impl CirclescanConfig {
    /// Load configuration from the process environment
    ///
    /// A `.env` file in the working directory is loaded first if present.
    /// Recognized variables: `RPC_URL`, `ALCHEMY_API_KEY`, `CIRCLES_FILE`,
    /// `THROTTLE_MAX_CONCURRENT`, `THROTTLE_RELEASE_DELAY_MS` and
    /// `REFRESH_INTERVAL_SECS`. Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// This is what [`from_env`](Self::from_env) uses under the hood.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self {
            rpc_url: non_empty("RPC_URL"),
            alchemy_api_key: non_empty("ALCHEMY_API_KEY"),
            ..Self::default()
        };

        if let Some(path) = non_empty("CIRCLES_FILE") {
            config.circles_file = PathBuf::from(path);
        }
        if let Some(raw) = non_empty("THROTTLE_MAX_CONCURRENT") {
            let max = parse_number::<usize>("THROTTLE_MAX_CONCURRENT", &raw)?;
            if max == 0 {
                return Err(ConfigError::invalid_value(
                    "THROTTLE_MAX_CONCURRENT",
                    "must be greater than 0",
                ));
            }
            config.throttle.max_concurrent = max;
        }
        if let Some(raw) = non_empty("THROTTLE_RELEASE_DELAY_MS") {
            config.throttle.release_delay =
                Duration::from_millis(parse_number("THROTTLE_RELEASE_DELAY_MS", &raw)?);
        }
        if let Some(raw) = non_empty("REFRESH_INTERVAL_SECS") {
            config.refresh_interval =
                Duration::from_secs(parse_number("REFRESH_INTERVAL_SECS", &raw)?);
        }

        Ok(config)
    }

    /// Resolve the JSON-RPC endpoint to read circles from
    ///
    /// Prefers the explicit `rpc_url`, then a hosted endpoint derived from
    /// `alchemy_api_key` and `chain`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use circlescan::CirclescanConfigBuilder;
    ///
    /// let config = CirclescanConfigBuilder::new().alchemy_api_key("demo").build();
    /// assert_eq!(
    ///     config.resolve_rpc_url().unwrap(),
    ///     "https://eth-sepolia.g.alchemy.com/v2/demo"
    /// );
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRpcUrl`] when neither is set, and
    /// [`ConfigError::UnsupportedChain`] when the key cannot be mapped to an endpoint.
    pub fn resolve_rpc_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = &self.rpc_url {
            return Ok(url.clone());
        }

        let key = self
            .alchemy_api_key
            .as_deref()
            .ok_or(ConfigError::MissingRpcUrl)?;

        let network = alchemy_network(self.chain).ok_or_else(|| ConfigError::UnsupportedChain {
            chain: self.chain.to_string(),
        })?;

        Ok(format!("https://{network}.g.alchemy.com/v2/{key}"))
    }
}

/// Hosted-endpoint subdomain for chains with a known Alchemy network
fn alchemy_network(chain: NamedChain) -> Option<&'static str> {
    match chain {
        NamedChain::Mainnet => Some("eth-mainnet"),
        NamedChain::Sepolia => Some("eth-sepolia"),
        NamedChain::Holesky => Some("eth-holesky"),
        NamedChain::Base => Some("base-mainnet"),
        NamedChain::BaseSepolia => Some("base-sepolia"),
        NamedChain::Optimism => Some("opt-mainnet"),
        NamedChain::OptimismSepolia => Some("opt-sepolia"),
        NamedChain::Arbitrum => Some("arb-mainnet"),
        NamedChain::ArbitrumSepolia => Some("arb-sepolia"),
        NamedChain::Polygon => Some("polygon-mainnet"),
        _ => None,
    }
}

fn parse_number<T>(field: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::invalid_value(field, e.to_string()))
}

/// Builder for [`CirclescanConfig`]
///
/// # Example
///
/// ```rust
/// use circlescan::CirclescanConfigBuilder;
/// use alloy_chains::NamedChain;
/// use std::time::Duration;
///
/// let config = CirclescanConfigBuilder::new()
///     .chain(NamedChain::BaseSepolia)
///     .alchemy_api_key("key")
///     .refresh_interval(Duration::from_secs(30))
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct CirclescanConfigBuilder {
    config: CirclescanConfig,
}

impl CirclescanConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the explicit JSON-RPC endpoint
    pub fn rpc_url(mut self, url: impl Into<String>) -> Self {
        self.config.rpc_url = Some(url.into());
        self
    }

    /// Set the API key used to derive a hosted endpoint
    pub fn alchemy_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.alchemy_api_key = Some(key.into());
        self
    }

    /// Set the chain the circles live on
    pub fn chain(mut self, chain: NamedChain) -> Self {
        self.config.chain = chain;
        self
    }

    /// Set the maximum number of concurrent RPC calls
    ///
    /// Values below 1 are clamped to 1.
    pub fn max_concurrent(mut self, max: usize) -> Self {
        self.config.throttle.max_concurrent = max.max(1);
        self
    }

    /// Set the cooldown before a throttle slot is reused
    pub fn release_delay(mut self, delay: Duration) -> Self {
        self.config.throttle.release_delay = delay;
        self
    }

    /// Set the background polling interval of pooled providers
    pub fn provider_poll_interval(mut self, interval: Duration) -> Self {
        self.config.provider_poll_interval = interval;
        self
    }

    /// Set the observer refresh interval
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.config.refresh_interval = interval;
        self
    }

    /// Set how registered members are discovered
    pub fn membership(mut self, membership: MembershipSource) -> Self {
        self.config.membership = membership;
        self
    }

    /// Set the deployed-circle address list file
    pub fn circles_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.circles_file = path.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> CirclescanConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CirclescanConfig::default();
        assert_eq!(config.chain, NamedChain::Sepolia);
        assert_eq!(config.throttle.max_concurrent, 3);
        assert_eq!(config.throttle.release_delay, Duration::from_millis(200));
        assert_eq!(config.refresh_interval, Duration::from_secs(15));
        assert_eq!(config.provider_poll_interval, Duration::from_secs(30));
        assert_eq!(config.membership, MembershipSource::IndexScan { max_users: 200 });
    }

    #[test]
    fn test_explicit_url_wins_over_key() {
        let config = CirclescanConfigBuilder::new()
            .rpc_url("http://localhost:8545")
            .alchemy_api_key("ignored")
            .build();
        assert_eq!(config.resolve_rpc_url().unwrap(), "http://localhost:8545");
    }

    #[test]
    fn test_missing_rpc_url() {
        let config = CirclescanConfig::default();
        assert_eq!(config.resolve_rpc_url(), Err(ConfigError::MissingRpcUrl));
    }

    #[test]
    fn test_key_derived_url_per_chain() {
        let config = CirclescanConfigBuilder::new()
            .chain(NamedChain::Base)
            .alchemy_api_key("abc")
            .build();
        assert_eq!(
            config.resolve_rpc_url().unwrap(),
            "https://base-mainnet.g.alchemy.com/v2/abc"
        );
    }

    #[test]
    fn test_key_for_unknown_chain_is_rejected() {
        let config = CirclescanConfigBuilder::new()
            .chain(NamedChain::Sonic)
            .alchemy_api_key("abc")
            .build();
        assert!(matches!(
            config.resolve_rpc_url(),
            Err(ConfigError::UnsupportedChain { .. })
        ));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = CirclescanConfig::from_lookup(lookup(&[
            ("RPC_URL", "https://rpc.example"),
            ("CIRCLES_FILE", "/tmp/circles.txt"),
            ("THROTTLE_MAX_CONCURRENT", "5"),
            ("THROTTLE_RELEASE_DELAY_MS", "50"),
            ("REFRESH_INTERVAL_SECS", "60"),
        ]))
        .unwrap();

        assert_eq!(config.rpc_url.as_deref(), Some("https://rpc.example"));
        assert_eq!(config.circles_file, PathBuf::from("/tmp/circles.txt"));
        assert_eq!(config.throttle.max_concurrent, 5);
        assert_eq!(config.throttle.release_delay, Duration::from_millis(50));
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_from_lookup_endpoint_only_keeps_defaults() {
        let config = CirclescanConfig::from_lookup(lookup(&[("ALCHEMY_API_KEY", "abc")])).unwrap();
        let defaults = CirclescanConfig::default();

        assert_eq!(config.alchemy_api_key.as_deref(), Some("abc"));
        assert!(config.rpc_url.is_none());
        assert_eq!(config.chain, defaults.chain);
        assert_eq!(config.circles_file, defaults.circles_file);
        assert_eq!(config.throttle, defaults.throttle);
        assert_eq!(config.refresh_interval, defaults.refresh_interval);
        assert_eq!(config.membership, defaults.membership);
    }

    #[test]
    fn test_from_lookup_ignores_blank_values() {
        let config = CirclescanConfig::from_lookup(lookup(&[("RPC_URL", "  ")])).unwrap();
        assert!(config.rpc_url.is_none());
    }

    #[test]
    fn test_from_lookup_rejects_bad_numbers() {
        let err = CirclescanConfig::from_lookup(lookup(&[("THROTTLE_MAX_CONCURRENT", "many")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "THROTTLE_MAX_CONCURRENT"));

        let err = CirclescanConfig::from_lookup(lookup(&[("THROTTLE_MAX_CONCURRENT", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_builder_clamps_concurrency() {
        let config = CirclescanConfigBuilder::new().max_concurrent(0).build();
        assert_eq!(config.throttle.max_concurrent, 1);
    }
}
