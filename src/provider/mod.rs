// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Provider utilities for circle reads
//!
//! Circle reads are always issued through a [`ConnectionPool`], which keeps
//! one throttled HTTP provider per endpoint URL.

mod pool;

pub use pool::{ConnectionPool, PooledProvider};
