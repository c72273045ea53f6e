// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Point-in-time snapshot of a circle contract's public state

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Snapshot of one circle contract
///
/// Produced by a single read of the contract and treated as authoritative
/// until the next successful refresh replaces it wholesale. Token amounts
/// stay as `U256`; counters and timestamps are narrowed to `u64`.
///
/// # Examples
///
/// ```
/// use circlescan::CircleSnapshot;
/// use alloy_primitives::{Address, U256};
///
/// let snapshot = CircleSnapshot {
///     address: Address::ZERO,
///     name: "Neighbourhood".to_string(),
///     curr_round: 2,
///     num_rounds: 10,
///     installment_size: U256::from(100),
///     num_users: 10,
///     protocol_token_reward_per_installment: U256::from(5),
///     max_protocol_token_in_auction: U256::from(50),
///     time_per_round: 86_400,
///     start_time: 1_700_000_000,
///     next_round_to_pay: 2,
///     round_deadline: 1_700_259_200,
/// };
///
/// assert_eq!(snapshot.prize(), U256::from(1000));
/// assert!(!snapshot.is_finished());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleSnapshot {
    /// Contract address the snapshot was read from
    pub address: Address,
    /// Display name of the circle
    pub name: String,
    /// Index of the round currently in progress
    pub curr_round: u64,
    /// Total number of rounds
    pub num_rounds: u64,
    /// Stablecoin amount every member pays per round
    pub installment_size: U256,
    /// Member capacity of the circle
    pub num_users: u64,
    /// Protocol tokens minted to a member per paid installment
    pub protocol_token_reward_per_installment: U256,
    /// Maximum protocol tokens a member may bid in one auction
    pub max_protocol_token_in_auction: U256,
    /// Round duration in seconds
    pub time_per_round: u64,
    /// Unix timestamp of the first round
    pub start_time: u64,
    /// Index of the next round whose payout is outstanding
    pub next_round_to_pay: u64,
    /// Unix timestamp at which the current round closes
    pub round_deadline: u64,
}

impl CircleSnapshot {
    /// Pot paid out each round: installment size times member capacity
    #[must_use]
    pub fn prize(&self) -> U256 {
        self.installment_size.saturating_mul(U256::from(self.num_users))
    }

    /// Seconds until the round deadline, zero once it has passed
    #[must_use]
    pub fn seconds_left(&self, now: u64) -> u64 {
        self.round_deadline.saturating_sub(now)
    }

    /// Whether every round has been played
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.curr_round >= self.num_rounds
    }

    /// Deadline of `round` derived from the schedule
    ///
    /// Used when the contract cannot answer `roundDeadline` itself.
    #[must_use]
    pub fn scheduled_deadline(start_time: u64, time_per_round: u64, round: u64) -> u64 {
        start_time.saturating_add(time_per_round.saturating_mul(round.saturating_add(1)))
    }
}
