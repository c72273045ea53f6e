//! Solidity bindings for the savings circle contract
//!
//! Only the read-only surface is bound: scalar state getters, the member
//! registry and the registration event.
//!
//! # Example: Reading the current round
//!
//! ```rust,ignore
//! use circlescan::circle::ISavingCircle;
//!
//! let contract = ISavingCircle::new(circle_address, &provider);
//! let round = contract.currRound().call().await?;
//! ```
//!
//! # Example: Filtering registrations
//!
//! ```rust,ignore
//! use circlescan::circle::UserRegistered;
//! use alloy_rpc_types::Filter;
//! use alloy_sol_types::SolEvent;
//!
//! let filter = Filter::new()
//!     .address(circle_address)
//!     .event_signature(UserRegistered::SIGNATURE_HASH)
//!     .from_block(0);
//! ```

use std::fmt::Debug;

use alloy_sol_types::sol;

sol! {
    /// Read-only interface of a rotating savings circle
    #[sol(rpc)]
    interface ISavingCircle {
        /// Display name of the circle
        function name() external view returns (string memory);

        /// Index of the round in progress
        function currRound() external view returns (uint256);

        /// Total number of rounds
        function numRounds() external view returns (uint256);

        /// Stablecoin installment owed per member per round
        function installmentSize() external view returns (uint256);

        /// Member capacity
        function numUsers() external view returns (uint256);

        /// Protocol tokens rewarded per paid installment
        function protocolTokenRewardPerInstallment() external view returns (uint256);

        /// Cap on protocol tokens bid in one auction
        function maxProtocolTokenInAuction() external view returns (uint256);

        /// Round duration in seconds
        function timePerRound() external view returns (uint256);

        /// Unix timestamp of the first round
        function startTime() external view returns (uint256);

        /// Next round whose payout is outstanding
        function nextRoundToPay() external view returns (uint256);

        /// Closing timestamp of `round`
        function roundDeadline(uint256 round) external view returns (uint256);

        /// Member registered at `index`
        function registeredUsers(uint256 index) external view returns (address);

        /// Emitted once per successful registration
        event UserRegistered(address indexed user);
    }
}

pub use ISavingCircle::UserRegistered;

impl Debug for UserRegistered {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserRegistered(user: {})", self.user)
    }
}
