//! # Identity-Verification Registry
//!
//! Windfall only lets verified identities hold or increase share balance.
//! Verification itself happens off-ledger (a compliance provider, an
//! attestation service — not our problem); what reaches this crate is the
//! result: a per-account `verified_until` timestamp. An account is eligible
//! at instant `t` iff `verified_until >= t`.
//!
//! The vault consumes eligibility through the [`EligibilityOracle`] trait so
//! tests can substitute simulated verification state. The in-memory
//! [`VerificationRegistry`] is the reference implementation; it uses an
//! interior `RwLock` so an operator task can extend or revoke verification
//! while the vault holds a shared handle.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::account::AccountId;

/// Read-only view of identity-verification state.
pub trait EligibilityOracle: Send + Sync {
    /// Returns the timestamp until which `account` is verified, or `None`
    /// if the account has never been verified.
    fn verified_until(&self, account: &AccountId) -> Option<DateTime<Utc>>;

    /// Returns `true` if `account` is eligible at instant `now`.
    fn is_eligible(&self, account: &AccountId, now: DateTime<Utc>) -> bool {
        self.verified_until(account)
            .map(|until| until >= now)
            .unwrap_or(false)
    }
}

/// In-memory verification registry.
#[derive(Debug, Default)]
pub struct VerificationRegistry {
    entries: RwLock<HashMap<AccountId, DateTime<Utc>>>,
}

impl VerificationRegistry {
    /// Creates an empty registry. No account is eligible until verified.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `account` as verified until `until`.
    ///
    /// Overwrites any previous window — shortening a window is how a
    /// verification provider downgrades an account without fully revoking.
    pub fn set_verified_until(&self, account: AccountId, until: DateTime<Utc>) {
        self.entries.write().insert(account, until);
    }

    /// Removes `account`'s verification entirely.
    pub fn revoke(&self, account: &AccountId) {
        self.entries.write().remove(account);
    }

    /// Returns the number of accounts with a verification entry (including
    /// expired ones).
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if no account has ever been verified.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl EligibilityOracle for VerificationRegistry {
    fn verified_until(&self, account: &AccountId) -> Option<DateTime<Utc>> {
        self.entries.read().get(account).copied()
    }
}
