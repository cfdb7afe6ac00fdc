//! # Time-Weighted Balance History Ledger
//!
//! The authoritative store of share balances. Every mint, burn, and transfer
//! appends a [`Checkpoint`] to the affected accounts' histories, so the
//! ledger can later answer the one historical question the prize vault
//! asks: *what was this account's time-weighted average balance over a
//! window?* That average (the "TWAB") is the proxy for how much win-chance
//! capital an account held, and it is what the proportional claim cap is
//! computed against.
//!
//! The ledger enforces only local bookkeeping invariants — no negative
//! balances, no supply overflow. Eligibility and deposit-limit gating are
//! the vault crate's responsibility and happen *before* any call lands here.
//!
//! ## Checkpoint model
//!
//! Histories are append-only sequences of `(timestamp, balance)` pairs.
//! Recording at a timestamp not later than the last checkpoint overwrites
//! the last entry instead of appending, so there is exactly one checkpoint
//! per instant and histories stay sorted without ever re-sorting.
//!
//! Weighting resolution is one second. Sub-second fractions of a window are
//! ignored, which matches the second-granularity timestamps the rest of the
//! system uses.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::AccountId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Attempted to burn or transfer more than the available balance.
    #[error("insufficient balance: account {account} has {available}, requested {requested}")]
    InsufficientBalance {
        /// The account being debited.
        account: AccountId,
        /// The current balance.
        available: u64,
        /// The amount that was requested.
        requested: u64,
    },

    /// A mint or transfer would push an account balance past `u64::MAX`.
    #[error("balance overflow: account {account} at {current}, credit {amount}")]
    BalanceOverflow {
        /// The account being credited.
        account: AccountId,
        /// The balance before the failed credit.
        current: u64,
        /// The amount that caused the overflow.
        amount: u64,
    },

    /// A mint would push the total supply past `u64::MAX`.
    #[error("supply overflow: supply at {current_supply}, mint {amount}")]
    SupplyOverflow {
        /// The total supply before the failed mint.
        current_supply: u64,
        /// The amount that caused the overflow.
        amount: u64,
    },

    /// A time-weighted average was requested over an empty or inverted window.
    #[error("empty observation window: start {start}, end {end}")]
    EmptyWindow {
        /// Window start (inclusive).
        start: DateTime<Utc>,
        /// Window end (exclusive).
        end: DateTime<Utc>,
    },

    /// An internal narrowing conversion overflowed.
    ///
    /// Amounts are attacker-influenced, so narrowing must fail loudly
    /// rather than silently wrap.
    #[error("arithmetic overflow during time-weighted average computation")]
    Arithmetic,
}

// ---------------------------------------------------------------------------
// Checkpoint & BalanceHistory
// ---------------------------------------------------------------------------

/// A single point in an account's balance history: the balance that held
/// from `at` until the next checkpoint (or now).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// When the balance changed.
    pub at: DateTime<Utc>,
    /// The balance from this instant onward.
    pub balance: u64,
}

/// Append-only balance history for one account.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct BalanceHistory {
    checkpoints: Vec<Checkpoint>,
}

impl BalanceHistory {
    /// Records a new balance at `at`.
    ///
    /// If `at` is not strictly later than the last checkpoint, the last
    /// entry is overwritten — the execution model serializes operations,
    /// so two mutations in the same second collapse into one checkpoint.
    fn record(&mut self, at: DateTime<Utc>, balance: u64) {
        if let Some(last) = self.checkpoints.last_mut() {
            if at <= last.at {
                last.balance = balance;
                return;
            }
        }
        self.checkpoints.push(Checkpoint { at, balance });
    }

    /// Returns the balance that held at instant `at` (0 before the first
    /// checkpoint).
    fn balance_at(&self, at: DateTime<Utc>) -> u64 {
        // partition_point: index of the first checkpoint strictly after `at`.
        let idx = self.checkpoints.partition_point(|cp| cp.at <= at);
        if idx == 0 {
            0
        } else {
            self.checkpoints[idx - 1].balance
        }
    }

    /// Computes the duration-weighted mean balance over `[start, end)`.
    fn time_weighted_average(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64, LedgerError> {
        let total_secs = (end - start).num_seconds();
        if total_secs <= 0 {
            return Err(LedgerError::EmptyWindow { start, end });
        }

        // Walk the checkpoints that fall strictly inside the window,
        // accumulating balance * held-duration in u128. Each term is at most
        // u64::MAX * u64::MAX, and the sum is bounded by
        // max_balance * total_secs, so u128 cannot overflow here.
        let mut weighted: u128 = 0;
        let mut cursor = start;
        let mut current = self.balance_at(start) as u128;

        let first_inside = self.checkpoints.partition_point(|cp| cp.at <= start);
        for cp in &self.checkpoints[first_inside..] {
            if cp.at >= end {
                break;
            }
            let held = (cp.at - cursor).num_seconds() as u128;
            weighted += current * held;
            cursor = cp.at;
            current = cp.balance as u128;
        }
        let held = (end - cursor).num_seconds() as u128;
        weighted += current * held;

        let average = weighted / total_secs as u128;
        u64::try_from(average).map_err(|_| LedgerError::Arithmetic)
    }
}

// ---------------------------------------------------------------------------
// TwabLedger
// ---------------------------------------------------------------------------

/// The balance-and-history ledger shared by all vault accounts.
///
/// Maintains current balances, total supply, and per-account checkpoint
/// histories. All mutation goes through [`mint`](Self::mint),
/// [`burn`](Self::burn), and [`transfer`](Self::transfer), each of which
/// takes the operation timestamp explicitly — the ledger has no clock of
/// its own.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TwabLedger {
    /// Current balances. Absent entry means zero.
    #[serde(with = "crate::account::account_id_map")]
    balances: HashMap<AccountId, u64>,

    /// Checkpoint histories, grown lazily on first mutation.
    #[serde(with = "crate::account::account_id_map")]
    histories: HashMap<AccountId, BalanceHistory>,

    /// Sum of all balances. Invariant: equals the sum of `balances` values.
    total_supply: u64,
}

impl TwabLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current balance of `account` (0 if never seen).
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Returns the current total share supply.
    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Returns the checkpoint history of `account` (empty if never mutated).
    pub fn history(&self, account: &AccountId) -> &[Checkpoint] {
        self.histories
            .get(account)
            .map(|h| h.checkpoints.as_slice())
            .unwrap_or(&[])
    }

    /// Pre-flight check: would `mint(account, amount)` succeed right now?
    ///
    /// Callers that must not mutate any state after a failure point (the
    /// vault facade orders all checks before all effects) call this before
    /// moving assets.
    pub fn mintable(&self, account: &AccountId, amount: u64) -> Result<(), LedgerError> {
        let current = self.balance_of(account);
        current
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow {
                account: *account,
                current,
                amount,
            })?;
        self.total_supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow {
                current_supply: self.total_supply,
                amount,
            })?;
        Ok(())
    }

    /// Mints `amount` new shares to `account` at instant `at`.
    ///
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// [`LedgerError::BalanceOverflow`] or [`LedgerError::SupplyOverflow`]
    /// if either counter would wrap. No state changes on error.
    pub fn mint(
        &mut self,
        account: &AccountId,
        amount: u64,
        at: DateTime<Utc>,
    ) -> Result<u64, LedgerError> {
        self.mintable(account, amount)?;

        let new_balance = self.balance_of(account) + amount;
        self.total_supply += amount;
        self.balances.insert(*account, new_balance);
        self.record(account, at, new_balance);

        Ok(new_balance)
    }

    /// Burns `amount` shares from `account` at instant `at`.
    ///
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientBalance`] if `amount` exceeds the current
    /// balance. No state changes on error.
    pub fn burn(
        &mut self,
        account: &AccountId,
        amount: u64,
        at: DateTime<Utc>,
    ) -> Result<u64, LedgerError> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: *account,
                available,
                requested: amount,
            });
        }

        let new_balance = available - amount;
        self.total_supply -= amount;
        self.balances.insert(*account, new_balance);
        self.record(account, at, new_balance);

        Ok(new_balance)
    }

    /// Moves `amount` shares from `from` to `to` at instant `at`.
    ///
    /// A self-transfer (`from == to`) only validates the balance; it records
    /// no checkpoint because no balance changed.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientBalance`] if `from` cannot cover `amount`.
    /// No state changes on error.
    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
        at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(LedgerError::InsufficientBalance {
                account: *from,
                available: from_balance,
                requested: amount,
            });
        }

        if from == to {
            return Ok(());
        }

        let to_balance =
            self.balance_of(to)
                .checked_add(amount)
                .ok_or(LedgerError::BalanceOverflow {
                    account: *to,
                    current: self.balance_of(to),
                    amount,
                })?;

        self.balances.insert(*from, from_balance - amount);
        self.balances.insert(*to, to_balance);
        self.record(from, at, from_balance - amount);
        self.record(to, at, to_balance);

        Ok(())
    }

    /// Returns the time-weighted average balance of `account` over the
    /// half-open window `[start, end)`.
    ///
    /// The average is the duration-weighted mean of the balance across the
    /// window, floor-divided — an account that held 100 shares for half the
    /// window and 0 for the other half averages 50.
    ///
    /// # Errors
    ///
    /// [`LedgerError::EmptyWindow`] if `end <= start`.
    pub fn time_weighted_average(
        &self,
        account: &AccountId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64, LedgerError> {
        match self.histories.get(account) {
            Some(history) => history.time_weighted_average(start, end),
            None => {
                // Never mutated: the balance was zero for the whole window,
                // but the window itself must still be valid.
                if end <= start {
                    Err(LedgerError::EmptyWindow { start, end })
                } else {
                    Ok(0)
                }
            }
        }
    }

    fn record(&mut self, account: &AccountId, at: DateTime<Utc>, balance: u64) {
        self.histories
            .entry(*account)
            .or_default()
            .record(at, balance);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
