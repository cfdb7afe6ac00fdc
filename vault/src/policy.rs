//! # Deposit Limit Policy
//!
//! One mutable scalar shared by every account: the per-account balance
//! ceiling. The owner can move it at any time and the new value applies
//! immediately and retroactively to headroom computation — but never to
//! existing balances. An account left above a lowered limit is *frozen*
//! (zero headroom), not clawed back.
//!
//! Per the redesign of the original's bare mutable global, the limit lives
//! in an explicit configuration cell that keeps a timestamped audit log of
//! every change. Readers always take the live value; nothing caches it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry in the limit audit log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitChange {
    /// When the limit was changed.
    pub at: DateTime<Utc>,
    /// The value before the change.
    pub previous: u64,
    /// The value after the change.
    pub new: u64,
}

/// The per-account balance ceiling with its change history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DepositLimitPolicy {
    limit: u64,
    changes: Vec<LimitChange>,
}

impl DepositLimitPolicy {
    /// Creates a policy with the given initial limit. The initial value is
    /// not logged as a change.
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            changes: Vec::new(),
        }
    }

    /// Returns the current limit.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Overwrites the limit, logging the change. Returns the previous value.
    ///
    /// Owner gating happens at the facade; this type only records.
    pub fn set_limit(&mut self, new: u64, at: DateTime<Utc>) -> u64 {
        let previous = self.limit;
        self.changes.push(LimitChange { at, previous, new });
        self.limit = new;
        previous
    }

    /// Returns the remaining headroom for an account with the given current
    /// balance: `max(0, limit - current_balance)`.
    ///
    /// Saturating by design: a balance stranded above the limit by a
    /// subsequent limit reduction yields zero headroom, not an underflow.
    /// Eligibility zeroing is layered on top by the gate.
    pub fn headroom(&self, current_balance: u64) -> u64 {
        self.limit.saturating_sub(current_balance)
    }

    /// Returns the audit log of limit changes, oldest first.
    pub fn change_log(&self) -> &[LimitChange] {
        &self.changes
    }
}
