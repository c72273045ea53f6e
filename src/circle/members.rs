// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Registered member discovery
//!
//! Two strategies are available:
//!
//! - [`fetch_registered_users_by_index`] walks `registeredUsers(i)` up to
//!   `min(numUsers, max_users)`. Cheap for small circles and works on any
//!   provider.
//! - [`fetch_registered_users_from_events`] replays `UserRegistered` logs
//!   from genesis to the latest block, optionally in fixed-size chunks for
//!   providers that cap `eth_getLogs` ranges.

use alloy_primitives::{Address, BlockNumber, U256};
use alloy_provider::Provider;
use alloy_rpc_types::Filter;
use alloy_sol_types::SolEvent;
use tracing::{debug, Instrument};

use super::abi::{ISavingCircle, UserRegistered};
use super::snapshot::narrow;
use crate::config::MembershipSource;
use crate::errors::{CircleReadError, RpcError};
use crate::spans;
use crate::types::RegisteredUserSet;

/// Discover members using the configured strategy
pub async fn fetch_registered_users<P: Provider>(
    provider: &P,
    circle: Address,
    membership: MembershipSource,
) -> Result<RegisteredUserSet, CircleReadError> {
    match membership {
        MembershipSource::IndexScan { max_users } => {
            fetch_registered_users_by_index(provider, circle, max_users).await
        }
        MembershipSource::EventLog { chunk_size } => {
            fetch_registered_users_from_events(provider, circle, chunk_size).await
        }
    }
}

/// Read `registeredUsers(i)` for every index below `min(numUsers, max_users)`
///
/// Zero-address slots are skipped. The first failing index read ends the
/// scan and the members read so far are returned.
///
/// # Errors
///
/// Returns an error only if `numUsers()` itself cannot be read.
pub async fn fetch_registered_users_by_index<P: Provider>(
    provider: &P,
    circle: Address,
    max_users: u64,
) -> Result<RegisteredUserSet, CircleReadError> {
    let span = spans::fetch_registered_users(circle, "index");

    async move {
        let contract = ISavingCircle::new(circle, provider);

        let num_users = contract
            .numUsers()
            .call()
            .await
            .map_err(|e| RpcError::contract_call_failed("numUsers", e))?;
        let count = narrow(num_users).min(max_users);

        let mut users = RegisteredUserSet::new();
        for index in 0..count {
            match contract.registeredUsers(U256::from(index)).call().await {
                Ok(user) => {
                    users.insert(user);
                }
                Err(e) => {
                    debug!(circle = %circle, index, error = %e, "Member index scan stopped");
                    break;
                }
            }
        }

        debug!(circle = %circle, members = users.len(), "Scanned registered users");
        Ok(users)
    }
    .instrument(span)
    .await
}

/// Replay `UserRegistered` logs from block 0 to the latest block
///
/// With `chunk_size` set, the range is split into consecutive windows of at
/// most that many blocks, fetched sequentially.
///
/// # Errors
///
/// Fails fast on the first block number, log fetch or decode failure.
pub async fn fetch_registered_users_from_events<P: Provider>(
    provider: &P,
    circle: Address,
    chunk_size: Option<u64>,
) -> Result<RegisteredUserSet, CircleReadError> {
    let span = spans::fetch_registered_users(circle, "events");

    async move {
        let latest = provider
            .get_block_number()
            .await
            .map_err(RpcError::get_block_number_failed)?;

        let filter = Filter::new()
            .address(circle)
            .event_signature(UserRegistered::SIGNATURE_HASH);

        let mut users = RegisteredUserSet::new();
        for (from_block, to_block) in block_chunks(0, latest, chunk_size) {
            let chunk_filter = filter.clone().from_block(from_block).to_block(to_block);

            let logs = provider.get_logs(&chunk_filter).await.map_err(|e| {
                RpcError::get_logs_failed(format!("UserRegistered {from_block}-{to_block}"), e)
            })?;

            debug!(from_block, to_block, logs_count = logs.len(), "Fetched registration logs");

            for log in logs {
                let event = UserRegistered::decode_log(&log.inner)
                    .map_err(|e| CircleReadError::decode_failed(e.to_string()))?;
                users.insert(event.data.user);
            }
        }

        debug!(circle = %circle, members = users.len(), "Replayed registration events");
        Ok(users)
    }
    .instrument(span)
    .await
}

/// Split `[start, end]` into inclusive windows of at most `chunk_size` blocks
///
/// `None` or zero yields the whole range as one window.
pub fn block_chunks(
    start: BlockNumber,
    end: BlockNumber,
    chunk_size: Option<u64>,
) -> Vec<(BlockNumber, BlockNumber)> {
    if end < start {
        return Vec::new();
    }

    let Some(size) = chunk_size.filter(|size| *size > 0) else {
        return vec![(start, end)];
    };

    let mut chunks = Vec::new();
    let mut chunk_start = start;
    loop {
        let chunk_end = chunk_start.saturating_add(size - 1).min(end);
        chunks.push((chunk_start, chunk_end));
        if chunk_end == end {
            break;
        }
        chunk_start = chunk_end + 1;
    }
    chunks
}
