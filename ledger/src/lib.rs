// Copyright (c) 2026 Windfall Labs. MIT License.
// See LICENSE for details.

//! # Windfall Ledger — Collaborator Layer
//!
//! The bookkeeping substrate underneath the Windfall prize vault. The vault
//! crate decides *whether* a balance may change; this crate records *that* it
//! changed, and remembers the full history so a prize claim can ask "how much
//! did this account hold, on average, over the award window?"
//!
//! ## Modules
//!
//! - **account** — Opaque 32-byte account identities with hex round-trip.
//! - **clock** — Injectable time source. Production code uses the wall
//!   clock; tests drive a manual clock so every timestamp is deterministic.
//! - **twab** — The time-weighted balance history ledger: mint, burn,
//!   transfer, and the historical range query that powers claim capping.
//! - **verify** — The identity-verification registry: per-account
//!   `verified_until` timestamps consumed by the vault's balance gate.
//! - **custody** — Reference-asset custody: per-account asset balances plus
//!   the vault reserve that backs every outstanding share.
//!
//! ## Design Principles
//!
//! 1. All amounts are `u64` in smallest-unit denomination. No floating
//!    point, ever.
//! 2. Every mutation uses checked arithmetic. Wrapping arithmetic and money
//!    do not mix.
//! 3. Each operation checks everything it can fail on before touching state,
//!    so a returned error always means "nothing happened."
//! 4. Every public type is serializable (serde) for persistence and
//!    inspection.

pub mod account;
pub mod clock;
pub mod custody;
pub mod twab;
pub mod verify;

pub use account::AccountId;
pub use clock::{Clock, ManualClock, SystemClock};
pub use custody::{AssetBank, CustodyError};
pub use twab::{Checkpoint, LedgerError, TwabLedger};
pub use verify::{EligibilityOracle, VerificationRegistry};
