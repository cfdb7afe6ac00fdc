// Copyright (c) 2026 Windfall Labs. MIT License.
// See LICENSE for details.

//! # Windfall Vault — Balance Gating & Proportional Claim Engine
//!
//! The decision layer of the Windfall pooled-prize vault. Shares convert 1:1
//! with the reference asset in both directions — there is no yield, no rate
//! curve, no fee. What this crate adds on top of plain accounting is policy:
//!
//! - **Who may hold balance.** Every balance-increasing operation (mint,
//!   incoming transfer) requires the recipient to be currently verified by
//!   the external identity registry.
//! - **How much they may hold.** A single owner-adjustable deposit limit
//!   caps every account. Lowering it freezes over-limit accounts (no further
//!   increase) without ever force-reducing them.
//! - **How big prizes get paid.** When a claim lands on an account whose
//!   time-weighted average balance exceeded the limit over the award window,
//!   the payout is proportionally capped and the excess is redirected.
//!
//! ## Modules
//!
//! - **policy** — The deposit-limit configuration cell with its audit log.
//! - **gate** — The balance gate: eligibility + headroom authorization.
//! - **admin** — Owner / claimer / excess-recipient configuration.
//! - **events** — The observable event log every mutation appends to.
//! - **claims** — The prize-pool interface and the claim outcome record.
//! - **vault** — [`PrizeVault`](vault::PrizeVault), the facade that wires
//!   it all together.
//!
//! ## Design Principles
//!
//! 1. Checks before effects: every operation orders all fallible checks
//!    ahead of the first state mutation, so an error always means "nothing
//!    happened."
//! 2. Capabilities, not globals: the clock, the eligibility oracle, and the
//!    prize pool are injected traits, never ambient state.
//! 3. Checked arithmetic everywhere money flows; truncation direction in
//!    the claim cap is a tested contract, not an accident.

pub mod admin;
pub mod claims;
pub mod events;
pub mod gate;
pub mod policy;
pub mod vault;

pub use admin::{AdminError, VaultConfig};
pub use claims::{ClaimOutcome, DrawWindow, PoolError, PrizePool, PrizeSettlement};
pub use events::{EventRecord, VaultEvent};
pub use gate::{BalanceGate, GateError};
pub use policy::{DepositLimitPolicy, LimitChange};
pub use vault::{PrizeVault, VaultError};
