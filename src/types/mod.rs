// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types for circle reads.
//!
//! This module provides the value types that flow through the read path:
//! - Circle contract snapshots
//! - Registered member sets
//! - Listing rows joining the two

mod listing;
mod members;
mod snapshot;

pub use listing::CircleListItem;
pub use members::RegisteredUserSet;
pub use snapshot::CircleSnapshot;
