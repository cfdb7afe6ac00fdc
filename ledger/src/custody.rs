//! # Reference-Asset Custody
//!
//! The vault's shares are backed 1:1 by a reference asset. [`AssetBank`]
//! models where that asset sits: per-account external balances plus the
//! vault **reserve** — the pool of assets held in custody against
//! outstanding shares. The solvency invariant the vault maintains is
//! `total_supply <= reserve`.
//!
//! Three flows touch the reserve:
//!
//! - [`collect`](AssetBank::collect): deposit path — pull assets from a
//!   depositor into the reserve.
//! - [`disburse`](AssetBank::disburse): withdraw path and direct prize
//!   payments — pay assets out of the reserve.
//! - [`credit_reserve`](AssetBank::credit_reserve): prize settlement —
//!   the prize pool pays the won amount straight into custody.
//!
//! Every operation validates before mutating, so a returned error means
//! the bank is untouched.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::AccountId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during custody operations.
#[derive(Debug, Error)]
pub enum CustodyError {
    /// The payer's external asset balance cannot cover the pull.
    #[error("insufficient assets: account {account} has {available}, requested {requested}")]
    InsufficientAssets {
        /// The account being debited.
        account: AccountId,
        /// The account's current asset balance.
        available: u64,
        /// The amount that was requested.
        requested: u64,
    },

    /// The vault reserve cannot cover the payout.
    #[error("insufficient reserve: reserve holds {reserve}, requested {requested}")]
    InsufficientReserve {
        /// The current reserve.
        reserve: u64,
        /// The amount that was requested.
        requested: u64,
    },

    /// Arithmetic overflow on a credit.
    #[error("asset overflow: current {current}, credit {amount}")]
    Overflow {
        /// The balance before the failed credit.
        current: u64,
        /// The amount that caused the overflow.
        amount: u64,
    },
}

// ---------------------------------------------------------------------------
// AssetBank
// ---------------------------------------------------------------------------

/// In-memory custody of the reference asset.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AssetBank {
    /// External (non-custodied) asset balances per account.
    #[serde(with = "crate::account::account_id_map")]
    accounts: HashMap<AccountId, u64>,

    /// Assets held in vault custody, backing outstanding shares.
    reserve: u64,
}

impl AssetBank {
    /// Creates an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the external asset balance of `account`.
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.accounts.get(account).copied().unwrap_or(0)
    }

    /// Returns the assets currently held in vault custody.
    pub fn reserve(&self) -> u64 {
        self.reserve
    }

    /// Credits `amount` of the asset to `account` from outside the system
    /// (an on-ramp, a faucet, a settlement from another venue).
    pub fn credit_account(&mut self, account: &AccountId, amount: u64) -> Result<u64, CustodyError> {
        let current = self.balance_of(account);
        let new_balance = current
            .checked_add(amount)
            .ok_or(CustodyError::Overflow { current, amount })?;
        self.accounts.insert(*account, new_balance);
        Ok(new_balance)
    }

    /// Credits `amount` directly into the reserve. Used when a prize-pool
    /// settlement pays the vault.
    pub fn credit_reserve(&mut self, amount: u64) -> Result<u64, CustodyError> {
        self.reserve = self
            .reserve
            .checked_add(amount)
            .ok_or(CustodyError::Overflow {
                current: self.reserve,
                amount,
            })?;
        Ok(self.reserve)
    }

    /// Pulls `amount` from `from`'s external balance into the reserve.
    ///
    /// # Errors
    ///
    /// [`CustodyError::InsufficientAssets`] if `from` cannot cover `amount`.
    pub fn collect(&mut self, from: &AccountId, amount: u64) -> Result<(), CustodyError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(CustodyError::InsufficientAssets {
                account: *from,
                available,
                requested: amount,
            });
        }
        let new_reserve = self
            .reserve
            .checked_add(amount)
            .ok_or(CustodyError::Overflow {
                current: self.reserve,
                amount,
            })?;

        self.accounts.insert(*from, available - amount);
        self.reserve = new_reserve;
        Ok(())
    }

    /// Pre-flight check: can `to`'s external balance absorb a credit of
    /// `amount`?
    ///
    /// Callers that must not mutate any state after a failure point call
    /// this before burning or minting the shares that back the payout. The
    /// reserve side is deliberately not checked here: at pre-flight time
    /// the reserve may not have been credited yet, and the caller's own
    /// accounting (solvency, or a reserve credit in the same operation)
    /// guarantees it covers the disbursement.
    pub fn disbursable(&self, to: &AccountId, amount: u64) -> Result<(), CustodyError> {
        let current = self.balance_of(to);
        current
            .checked_add(amount)
            .ok_or(CustodyError::Overflow { current, amount })?;
        Ok(())
    }

    /// Pays `amount` out of the reserve to `to`'s external balance.
    ///
    /// # Errors
    ///
    /// [`CustodyError::InsufficientReserve`] if the reserve cannot cover
    /// `amount`; [`CustodyError::Overflow`] if `to`'s balance cannot absorb
    /// the credit.
    pub fn disburse(&mut self, to: &AccountId, amount: u64) -> Result<(), CustodyError> {
        if self.reserve < amount {
            return Err(CustodyError::InsufficientReserve {
                reserve: self.reserve,
                requested: amount,
            });
        }
        let current = self.balance_of(to);
        let new_balance = current
            .checked_add(amount)
            .ok_or(CustodyError::Overflow { current, amount })?;

        self.reserve -= amount;
        self.accounts.insert(*to, new_balance);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AccountId {
        AccountId::from_label("alice")
    }

    fn bob() -> AccountId {
        AccountId::from_label("bob")
    }

    #[test]
    fn collect_moves_assets_into_reserve() {
        let mut bank = AssetBank::new();
        bank.credit_account(&alice(), 1_000).unwrap();
        bank.collect(&alice(), 400).unwrap();

        assert_eq!(bank.balance_of(&alice()), 600);
        assert_eq!(bank.reserve(), 400);
    }

    #[test]
    fn collect_insufficient_rejected_untouched() {
        let mut bank = AssetBank::new();
        bank.credit_account(&alice(), 100).unwrap();

        let result = bank.collect(&alice(), 200);
        assert!(matches!(
            result,
            Err(CustodyError::InsufficientAssets {
                available: 100,
                requested: 200,
                ..
            })
        ));
        assert_eq!(bank.balance_of(&alice()), 100);
        assert_eq!(bank.reserve(), 0);
    }

    #[test]
    fn disburse_pays_out_of_reserve() {
        let mut bank = AssetBank::new();
        bank.credit_reserve(500).unwrap();
        bank.disburse(&bob(), 300).unwrap();

        assert_eq!(bank.reserve(), 200);
        assert_eq!(bank.balance_of(&bob()), 300);
    }

    #[test]
    fn disburse_beyond_reserve_rejected() {
        let mut bank = AssetBank::new();
        bank.credit_reserve(100).unwrap();

        let result = bank.disburse(&bob(), 200);
        assert!(matches!(
            result,
            Err(CustodyError::InsufficientReserve {
                reserve: 100,
                requested: 200,
            })
        ));
        assert_eq!(bank.reserve(), 100);
        assert_eq!(bank.balance_of(&bob()), 0);
    }

    #[test]
    fn credit_overflow_rejected() {
        let mut bank = AssetBank::new();
        bank.credit_account(&alice(), u64::MAX).unwrap();
        assert!(matches!(
            bank.credit_account(&alice(), 1),
            Err(CustodyError::Overflow { .. })
        ));
    }

    #[test]
    fn disbursable_flags_receiver_overflow() {
        let mut bank = AssetBank::new();
        bank.credit_account(&bob(), u64::MAX).unwrap();

        assert!(matches!(
            bank.disbursable(&bob(), 1),
            Err(CustodyError::Overflow { .. })
        ));
        assert!(bank.disbursable(&bob(), 0).is_ok());
        assert!(bank.disbursable(&alice(), 100).is_ok());
    }

    #[test]
    fn reserve_overflow_on_collect_rejected() {
        let mut bank = AssetBank::new();
        bank.credit_reserve(u64::MAX).unwrap();
        bank.credit_account(&alice(), 10).unwrap();

        let result = bank.collect(&alice(), 1);
        assert!(matches!(result, Err(CustodyError::Overflow { .. })));
        // Failed collect must not have debited the payer.
        assert_eq!(bank.balance_of(&alice()), 10);
    }
}
