//! # Balance Gate
//!
//! The enforcement layer in front of every balance-increasing operation.
//! Mints and the receiving side of transfers must pass
//! [`BalanceGate::authorize_increase`]; burns, the sending side, and
//! self-transfers never go through the gate.
//!
//! A gate is a cheap borrowing view constructed per operation: it captures
//! the policy, the eligibility oracle, and a single `now` instant so that
//! every check inside one operation sees the same time. Nothing about the
//! gate is cached across operations — the limit and the verification state
//! are always read live.

use chrono::{DateTime, Utc};
use thiserror::Error;

use windfall_ledger::{AccountId, EligibilityOracle};

use crate::policy::DepositLimitPolicy;

/// Errors raised by gate authorization.
#[derive(Debug, Error)]
pub enum GateError {
    /// The target identity is not currently verified.
    #[error("account {account} is not eligible (verification missing or expired)")]
    NotEligible {
        /// The account that failed the eligibility check.
        account: AccountId,
    },

    /// The increase would push the account past the deposit limit.
    ///
    /// Carries enough context for the caller to compute a valid smaller
    /// amount.
    #[error(
        "deposit limit exceeded: account {account} holds {current_balance}, \
         attempted +{attempted}, limit {limit}"
    )]
    LimitExceeded {
        /// The account that was being credited.
        account: AccountId,
        /// The account's balance before the attempted increase.
        current_balance: u64,
        /// The increase that was attempted.
        attempted: u64,
        /// The limit in force at the time of the attempt.
        limit: u64,
    },
}

/// A single-instant authorization view over policy and eligibility.
pub struct BalanceGate<'a> {
    policy: &'a DepositLimitPolicy,
    oracle: &'a dyn EligibilityOracle,
    now: DateTime<Utc>,
}

impl<'a> BalanceGate<'a> {
    /// Builds a gate for one operation happening at `now`.
    pub fn new(
        policy: &'a DepositLimitPolicy,
        oracle: &'a dyn EligibilityOracle,
        now: DateTime<Utc>,
    ) -> Self {
        Self { policy, oracle, now }
    }

    /// Returns `true` if `account` is verified at this gate's instant.
    pub fn is_eligible(&self, account: &AccountId) -> bool {
        self.oracle.is_eligible(account, self.now)
    }

    /// Returns how much `account` may still add to its balance: zero when
    /// ineligible, otherwise `max(0, limit - current_balance)`.
    ///
    /// This is the authoritative value behind `max_deposit` / `max_mint`.
    pub fn remaining_headroom(&self, account: &AccountId, current_balance: u64) -> u64 {
        if !self.is_eligible(account) {
            return 0;
        }
        self.policy.headroom(current_balance)
    }

    /// Authorizes a balance increase of `amount` for `account`.
    ///
    /// # Errors
    ///
    /// [`GateError::NotEligible`] if the account is not currently verified.
    /// [`GateError::LimitExceeded`] if `amount` exceeds the remaining
    /// headroom.
    pub fn authorize_increase(
        &self,
        account: &AccountId,
        current_balance: u64,
        amount: u64,
    ) -> Result<(), GateError> {
        if !self.is_eligible(account) {
            return Err(GateError::NotEligible { account: *account });
        }

        if amount > self.policy.headroom(current_balance) {
            return Err(GateError::LimitExceeded {
                account: *account,
                current_balance,
                attempted: amount,
                limit: self.policy.limit(),
            });
        }

        Ok(())
    }
}
