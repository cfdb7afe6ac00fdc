//! Observable vault events.
//!
//! Every state transition appends a timestamped [`EventRecord`] to the
//! vault's in-memory log and emits a `tracing` line. The log is the
//! verification surface for tests and the audit trail for operators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use windfall_ledger::AccountId;

/// A state transition worth observing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultEvent {
    /// The deposit limit was changed by the owner.
    LimitChanged { previous: u64, new: u64 },

    /// The claimer role was reassigned.
    ClaimerChanged {
        previous: AccountId,
        new: AccountId,
    },

    /// The excess recipient was reassigned.
    ExcessRecipientChanged {
        previous: AccountId,
        new: AccountId,
    },

    /// Shares moved. `from: None` is a mint, `to: None` is a burn.
    Transfer {
        from: Option<AccountId>,
        to: Option<AccountId>,
        amount: u64,
    },

    /// A prize claim settled, with the full payout breakdown.
    PrizeClaimed {
        winner: AccountId,
        tier: u8,
        total_value: u64,
        minted_to_winner: u64,
        paid_to_winner: u64,
        excess_redirected: u64,
        excess_recipient: AccountId,
    },
}

/// An event with the instant it occurred.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// When the event occurred.
    pub at: DateTime<Utc>,
    /// What happened.
    pub event: VaultEvent,
}
