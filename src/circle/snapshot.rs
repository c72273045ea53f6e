// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Snapshot fetching for a single circle contract

use std::future::IntoFuture;

use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use tracing::{debug, Instrument};

use super::abi::ISavingCircle;
use crate::errors::{CircleReadError, RpcError};
use crate::spans;
use crate::types::CircleSnapshot;

/// Read every public scalar of a circle contract into a [`CircleSnapshot`]
///
/// The ten state getters are issued concurrently. With a pooled provider
/// they pass through the pool's throttle, so at most `max_concurrent` of
/// them are on the wire at once. If
/// `roundDeadline(currRound)` reverts, the deadline is derived from the
/// schedule as `startTime + timePerRound * (currRound + 1)`.
///
/// # Errors
///
/// Returns [`CircleReadError::Rpc`] if any of the state getters fails.
pub async fn fetch_circle_snapshot<P: Provider>(
    provider: &P,
    circle: Address,
) -> Result<CircleSnapshot, CircleReadError> {
    let span = spans::fetch_circle_snapshot(circle);

    async move {
        let contract = ISavingCircle::new(circle, provider);

        let name = contract.name();
        let curr_round = contract.currRound();
        let num_rounds = contract.numRounds();
        let installment_size = contract.installmentSize();
        let num_users = contract.numUsers();
        let reward = contract.protocolTokenRewardPerInstallment();
        let auction_cap = contract.maxProtocolTokenInAuction();
        let time_per_round = contract.timePerRound();
        let start_time = contract.startTime();
        let next_round_to_pay = contract.nextRoundToPay();

        let (
            name,
            curr_round,
            num_rounds,
            installment_size,
            num_users,
            reward,
            auction_cap,
            time_per_round,
            start_time,
            next_round_to_pay,
        ) = tokio::try_join!(
            read("name", name.call()),
            read("currRound", curr_round.call()),
            read("numRounds", num_rounds.call()),
            read("installmentSize", installment_size.call()),
            read("numUsers", num_users.call()),
            read("protocolTokenRewardPerInstallment", reward.call()),
            read("maxProtocolTokenInAuction", auction_cap.call()),
            read("timePerRound", time_per_round.call()),
            read("startTime", start_time.call()),
            read("nextRoundToPay", next_round_to_pay.call()),
        )?;

        let round_deadline = match contract.roundDeadline(curr_round).call().await {
            Ok(deadline) => narrow(deadline),
            Err(e) => {
                debug!(circle = %circle, error = %e, "roundDeadline unavailable, deriving from schedule");
                CircleSnapshot::scheduled_deadline(
                    narrow(start_time),
                    narrow(time_per_round),
                    narrow(curr_round),
                )
            }
        };

        let snapshot = CircleSnapshot {
            address: circle,
            name,
            curr_round: narrow(curr_round),
            num_rounds: narrow(num_rounds),
            installment_size,
            num_users: narrow(num_users),
            protocol_token_reward_per_installment: reward,
            max_protocol_token_in_auction: auction_cap,
            time_per_round: narrow(time_per_round),
            start_time: narrow(start_time),
            next_round_to_pay: narrow(next_round_to_pay),
            round_deadline,
        };

        debug!(
            circle = %circle,
            name = %snapshot.name,
            curr_round = snapshot.curr_round,
            num_rounds = snapshot.num_rounds,
            "Fetched circle snapshot"
        );

        Ok(snapshot)
    }
    .instrument(span)
    .await
}

async fn read<T, F>(operation: &'static str, call: F) -> Result<T, RpcError>
where
    F: IntoFuture<Output = Result<T, alloy_contract::Error>>,
{
    call.await
        .map_err(|e| RpcError::contract_call_failed(operation, e))
}

/// Counters and timestamps never approach `u64::MAX` on a sane contract
pub(crate) fn narrow(value: U256) -> u64 {
    value.saturating_to::<u64>()
}
