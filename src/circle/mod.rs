// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Circle contract reads
//!
//! This module binds the savings circle contract and turns raw contract
//! state into [`CircleSnapshot`](crate::CircleSnapshot) and
//! [`RegisteredUserSet`](crate::RegisteredUserSet) values.
//!
//! The free functions work with any Alloy provider. [`RpcCircleSource`]
//! wraps them behind the [`CircleSource`] trait for the caching reader.

mod abi;
mod members;
mod snapshot;
mod source;

pub use abi::{ISavingCircle, UserRegistered};
pub use members::{
    block_chunks, fetch_registered_users, fetch_registered_users_by_index,
    fetch_registered_users_from_events,
};
pub use snapshot::fetch_circle_snapshot;
pub use source::{CircleSource, RpcCircleSource};
