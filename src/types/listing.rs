//! Circle listing rows

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::{CircleSnapshot, RegisteredUserSet};

/// One row of the deployed-circle listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleListItem {
    /// Lower-case hex address, stable across letter-case variants of the input
    pub id: String,
    /// Contract address
    pub address: Address,
    /// Latest snapshot of the contract
    pub contract: CircleSnapshot,
    /// Number of registered members
    pub members: u64,
    /// Member capacity
    pub max_members: u64,
    /// Pot paid out each round
    pub prize: U256,
    /// Seconds until the current round closes
    pub time_left: u64,
}

impl CircleListItem {
    /// Join a snapshot with its member list as of `now` (unix seconds)
    pub fn new(snapshot: CircleSnapshot, users: &RegisteredUserSet, now: u64) -> Self {
        Self {
            id: format!("{:#x}", snapshot.address),
            address: snapshot.address,
            members: users.len() as u64,
            max_members: snapshot.num_users,
            prize: snapshot.prize(),
            time_left: snapshot.seconds_left(now),
            contract: snapshot,
        }
    }

    /// Whether every seat is taken
    pub fn is_full(&self) -> bool {
        self.members >= self.max_members
    }
}
