//! # Prize-Pool Interface & Claim Records
//!
//! Prize settlement mechanics live outside this crate — draw scheduling,
//! winner selection, and the actual asset movement from the pool are the
//! prize pool's business. The vault sees the pool through one narrow trait,
//! [`PrizePool`]: resolve the award window for a tier, and settle a claim
//! for a well-typed value. Isolating the orchestration from the settlement
//! this way keeps the proportional-cap logic testable against simulated
//! pools.
//!
//! The cap algorithm itself runs in
//! [`PrizeVault::claim_prize`](crate::vault::PrizeVault::claim_prize); this
//! module defines the records it consumes and produces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use windfall_ledger::AccountId;

/// Errors surfaced by a prize pool during settlement.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The referenced prize does not exist or was already claimed.
    #[error("prize not claimable: tier {tier}, index {prize_index}")]
    NotClaimable {
        /// The prize tier.
        tier: u8,
        /// The prize index within the tier.
        prize_index: u32,
    },

    /// The winner did not win the referenced prize.
    #[error("account {winner} did not win tier {tier} prize {prize_index}")]
    NotAWinner {
        winner: AccountId,
        tier: u8,
        prize_index: u32,
    },
}

/// The half-open award window `[start, end)` for a prize tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawWindow {
    /// Window start (inclusive).
    pub start: DateTime<Utc>,
    /// Window end (exclusive).
    pub end: DateTime<Utc>,
}

/// The result of a pool-side claim settlement.
///
/// By the time this record is returned, the pool has paid the claim reward
/// to the reward recipient and transferred `total_value - claim_reward` of
/// the reference asset into vault custody.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeSettlement {
    /// The full prize value, before the claim reward is deducted.
    pub total_value: u64,
}

/// The external prize pool, reduced to what the vault needs.
pub trait PrizePool: Send + Sync {
    /// Resolves the award window for `tier` under the current draw state.
    fn draw_window(&self, tier: u8) -> DrawWindow;

    /// Settles the claim: pays `claim_reward` to `reward_recipient`,
    /// transfers the remainder of the prize into vault custody, and returns
    /// the total prize value.
    fn claim_prize(
        &self,
        winner: &AccountId,
        tier: u8,
        prize_index: u32,
        claim_reward: u64,
        reward_recipient: &AccountId,
    ) -> Result<PrizeSettlement, PoolError>;
}

/// The full breakdown of one settled claim.
///
/// Ephemeral by design: computed, logged, and returned within the claim
/// call, never persisted by the vault.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimOutcome {
    /// Receipt identifier for this settlement.
    pub claim_id: Uuid,
    /// The winning account.
    pub winner: AccountId,
    /// The prize tier.
    pub tier: u8,
    /// Total prize value reported by the pool, returned unchanged.
    pub total_value: u64,
    /// The reward already deducted and paid to the reward recipient.
    pub claim_reward: u64,
    /// The winner's time-weighted average balance over the award window.
    pub winner_twab: u64,
    /// The prize amount after proportional capping (before the headroom
    /// split). Equals `total_value - claim_reward` when no cap applied.
    pub capped_amount: u64,
    /// Portion of `capped_amount` minted to the winner as shares.
    pub minted_to_winner: u64,
    /// Portion of `capped_amount` paid to the winner directly in the asset
    /// because the winner ran out of headroom.
    pub paid_to_winner: u64,
    /// Prize value disallowed by the cap, paid to the excess recipient.
    /// Absorbs the floor-rounding loss.
    pub excess_redirected: u64,
    /// Where the excess went.
    pub excess_recipient: AccountId,
}

impl ClaimOutcome {
    /// Returns `true` if the proportional cap reduced this payout.
    pub fn was_capped(&self) -> bool {
        self.excess_redirected > 0
    }
}
