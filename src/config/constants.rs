//! Default limits and well-known values
//!
//! This module centralizes the magic constants used throughout the circlescan
//! crate, improving discoverability and maintainability.

use std::time::Duration;

/// Maximum number of RPC calls allowed in flight at once.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 3;

/// Cooldown before a finished call's throttle slot is handed to the next waiter.
pub const DEFAULT_RELEASE_DELAY: Duration = Duration::from_millis(200);

/// Background polling interval of pooled provider handles.
pub const DEFAULT_PROVIDER_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// How often observers refresh a circle snapshot or member list.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15);

/// Upper bound on `registeredUsers(i)` reads per index scan.
pub const DEFAULT_MAX_USERS: u64 = 200;

/// Default location of the newline-delimited deployed-circle address list.
pub const DEFAULT_CIRCLES_FILE: &str = "circles/deployed.txt";

/// Path of the read-only registry endpoint.
pub const DEPLOYED_CIRCLES_ROUTE: &str = "/api/deployed-circles";

/// Path of the circle listing endpoint.
pub const CIRCLES_ROUTE: &str = "/api/circles";
