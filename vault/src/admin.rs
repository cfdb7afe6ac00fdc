//! # Vault Administration
//!
//! Three privileged identities govern a vault: the **owner** (may move the
//! deposit limit and reassign the other roles), the **claimer** (the sole
//! identity allowed to trigger prize settlement), and the **excess
//! recipient** (receives prize value disallowed by the proportional cap).
//!
//! [`VaultConfig`] is a plain record plus validation; the owner-gated
//! setters live on the facade so every change lands in the event log.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use windfall_ledger::AccountId;

/// Errors raised by configuration checks.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The caller does not hold the required role.
    #[error("unauthorized: caller {caller} is not the vault owner")]
    Unauthorized {
        /// The identity that attempted the privileged operation.
        caller: AccountId,
    },

    /// An identity setter was given the all-zero sentinel.
    #[error("zero identity is not a valid role assignment")]
    ZeroIdentity,
}

/// The vault's privileged-role configuration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct VaultConfig {
    /// May change the deposit limit and reassign roles.
    pub owner: AccountId,
    /// The sole identity authorized to settle prize claims.
    pub claimer: AccountId,
    /// Receives prize value redirected by the proportional cap.
    pub excess_recipient: AccountId,
}

impl VaultConfig {
    /// Creates a config, rejecting zero identities for any role.
    pub fn new(
        owner: AccountId,
        claimer: AccountId,
        excess_recipient: AccountId,
    ) -> Result<Self, AdminError> {
        Self::ensure_nonzero(&owner)?;
        Self::ensure_nonzero(&claimer)?;
        Self::ensure_nonzero(&excess_recipient)?;
        Ok(Self {
            owner,
            claimer,
            excess_recipient,
        })
    }

    /// Fails with [`AdminError::Unauthorized`] unless `caller` is the owner.
    pub fn ensure_owner(&self, caller: &AccountId) -> Result<(), AdminError> {
        if *caller != self.owner {
            return Err(AdminError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    /// Fails with [`AdminError::ZeroIdentity`] on the zero sentinel.
    pub fn ensure_nonzero(account: &AccountId) -> Result<(), AdminError> {
        if account.is_zero() {
            return Err(AdminError::ZeroIdentity);
        }
        Ok(())
    }
}
