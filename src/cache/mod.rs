// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Address-keyed caches for circle reads.
//!
//! Two instances back the read path:
//! - [`CircleCache`] holds the latest [`CircleSnapshot`] per circle
//! - [`RegisteredUsersCache`] holds the latest [`RegisteredUserSet`] per circle
//!
//! Both are owned by a [`CircleReader`](crate::CircleReader) rather than
//! living in process-wide statics, so each reader (and each test) gets its
//! own isolated state.

mod address;

pub use address::{AddressCache, CacheKey, CacheStats};

use crate::types::{CircleSnapshot, RegisteredUserSet};

/// Cache of circle contract snapshots
pub type CircleCache = AddressCache<CircleSnapshot>;

/// Cache of registered member lists
pub type RegisteredUsersCache = AddressCache<RegisteredUserSet>;
