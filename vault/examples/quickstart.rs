//! Interactive CLI walkthrough of the full Windfall vault lifecycle.
//!
//! Walks through identity verification, gated deposits, a limit reduction
//! that freezes an over-limit account, and a prize claim that triggers the
//! proportional cap. The output uses ANSI escape codes for colored,
//! storytelling-style terminal rendering.
//!
//! Run with:
//!   cargo run --example quickstart
//!
//! Set RUST_LOG=debug to see the vault's structured trace alongside the
//! narration.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use windfall_ledger::{AccountId, Clock, EligibilityOracle, ManualClock, VerificationRegistry};
use windfall_vault::{
    DrawWindow, PoolError, PrizePool, PrizeSettlement, PrizeVault, VaultConfig,
};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

const BG_BLUE: &str = "\x1b[44m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn banner() {
    println!();
    println!(
        "{BG_BLUE}{BOLD}{WHITE}                                                                    {RESET}"
    );
    println!(
        "{BG_BLUE}{BOLD}{WHITE}    WINDFALL VAULT  --  Gated Deposits & Capped Prize Claims        {RESET}"
    );
    println!(
        "{BG_BLUE}{BOLD}{WHITE}    Version 0.1.0  |  1:1 shares, no yield, no fees                 {RESET}"
    );
    println!(
        "{BG_BLUE}{BOLD}{WHITE}                                                                    {RESET}"
    );
    println!();
}

fn section(num: u32, title: &str) {
    println!();
    println!(
        "{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]=============================================================={RESET}"
    );
    println!("{BOLD}{WHITE}  {title}{RESET}");
    println!(
        "{CYAN}------------------------------------------------------------------------{RESET}"
    );
}

fn subsection(text: &str) {
    println!("{DIM}{CYAN}  >> {text}{RESET}");
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn rejected(text: &str) {
    println!("{MAGENTA}  [REJECTED] {text}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn balance_row(name: &str, shares: u64, assets: u64, color: &str) {
    println!(
        "  {color}{BOLD}{name:<10}{RESET}  {WHITE}{shares:>10}{RESET} {DIM}shares{RESET}  {WHITE}{assets:>10}{RESET} {DIM}assets{RESET}"
    );
}

// ---------------------------------------------------------------------------
// A minimal prize pool for the walkthrough
// ---------------------------------------------------------------------------

/// One tier, one prize, one fixed award window.
struct DemoPool {
    window: DrawWindow,
    prize_value: u64,
}

impl PrizePool for DemoPool {
    fn draw_window(&self, _tier: u8) -> DrawWindow {
        self.window
    }

    fn claim_prize(
        &self,
        _winner: &AccountId,
        _tier: u8,
        _prize_index: u32,
        _claim_reward: u64,
        _reward_recipient: &AccountId,
    ) -> Result<PrizeSettlement, PoolError> {
        Ok(PrizeSettlement {
            total_value: self.prize_value,
        })
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn t0() -> DateTime<Utc> {
    Utc.timestamp_opt(1_750_000_000, 0).unwrap()
}

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();

    banner();

    // -----------------------------------------------------------------------
    // Step 1: Bootstrap
    // -----------------------------------------------------------------------

    section(1, "Vault Bootstrap");
    subsection("Wiring the verification registry, manual clock, prize pool, and vault...");

    let owner = AccountId::from_label("owner");
    let claimer = AccountId::from_label("claimer");
    let sink = AccountId::from_label("excess-sink");
    let alice = AccountId::from_label("alice");
    let bob = AccountId::from_label("bob");

    let registry = Arc::new(VerificationRegistry::new());
    let clock = Arc::new(ManualClock::new(t0()));
    let pool = Arc::new(DemoPool {
        window: DrawWindow {
            start: t0(),
            end: t0() + Duration::seconds(1_000),
        },
        prize_value: 40,
    });

    let config = VaultConfig::new(owner, claimer, sink).expect("non-zero roles");
    let mut vault = PrizeVault::new(
        config,
        300,
        Arc::clone(&registry) as Arc<dyn EligibilityOracle>,
        Arc::clone(&pool) as Arc<dyn PrizePool>,
        Arc::clone(&clock) as Arc<dyn Clock>,
    );

    info("Deposit limit", "300 per account");
    info("Award window", "1000 seconds");
    success("Vault ready");

    // -----------------------------------------------------------------------
    // Step 2: Eligibility gating
    // -----------------------------------------------------------------------

    section(2, "Identity Verification Gates Every Deposit");

    vault.fund_account(&alice, 1_000).expect("faucet");
    vault.fund_account(&bob, 1_000).expect("faucet");

    subsection("Alice tries to deposit before being verified...");
    match vault.deposit(&alice, &alice, 100) {
        Err(e) => rejected(&e.to_string()),
        Ok(_) => unreachable!("unverified deposit must fail"),
    }

    subsection("The verification provider attests Alice and Bob for one year...");
    registry.set_verified_until(alice, t0() + Duration::days(365));
    registry.set_verified_until(bob, t0() + Duration::days(365));
    success("Both identities verified");

    let minted = vault.deposit(&alice, &alice, 250).expect("gated deposit");
    info("Alice deposited", &minted.to_string());
    info("Alice max_deposit now", &vault.max_deposit(&alice).to_string());

    vault.deposit(&bob, &bob, 80).expect("gated deposit");

    println!();
    balance_row("Alice", vault.balance_of(&alice), vault.asset_balance_of(&alice), BLUE);
    balance_row("Bob", vault.balance_of(&bob), vault.asset_balance_of(&bob), GREEN);
    success("Deposits minted 1:1 into vault shares");

    // -----------------------------------------------------------------------
    // Step 3: The limit moves, balances do not
    // -----------------------------------------------------------------------

    section(3, "Lowering the Limit Freezes, Never Claws Back");
    subsection("The owner lowers the per-account limit from 300 to 100...");

    clock.advance_secs(1_000);
    vault
        .set_account_deposit_limit(&owner, 100)
        .expect("owner-gated");

    info("Alice balance", &vault.balance_of(&alice).to_string());
    info("Alice max_deposit", &vault.max_deposit(&alice).to_string());

    match vault.deposit(&alice, &alice, 1) {
        Err(e) => rejected(&e.to_string()),
        Ok(_) => unreachable!("over-limit deposit must fail"),
    }
    success("Alice is frozen above the limit but keeps her 250 shares");

    // -----------------------------------------------------------------------
    // Step 4: The capped prize claim
    // -----------------------------------------------------------------------

    section(4, "Prize Claim with Proportional Capping");
    subsection("Alice wins a 40-asset prize; her average balance over the");
    subsection("award window was 250 against a limit of 100...");

    let outcome = vault
        .claim_prize(&claimer, &alice, 0, 0, 0, &claimer)
        .expect("claim settles");

    info("Winner TWAB", &outcome.winner_twab.to_string());
    info("Total prize value", &outcome.total_value.to_string());
    info(
        "Capped payout",
        &format!(
            "{}  (floor(40 * 100 / 250))",
            outcome.capped_amount
        ),
    );
    info("Excess redirected", &outcome.excess_redirected.to_string());
    info("Claim receipt", &outcome.claim_id.to_string());

    println!();
    balance_row("Alice", vault.balance_of(&alice), vault.asset_balance_of(&alice), BLUE);
    balance_row("Sink", 0, vault.asset_balance_of(&sink), MAGENTA);

    assert!(outcome.was_capped());
    assert_eq!(
        outcome.minted_to_winner + outcome.paid_to_winner + outcome.excess_redirected,
        outcome.total_value
    );
    success("Prize conserved: capped portion to the winner, excess to the sink");

    // -----------------------------------------------------------------------
    // Step 5: Exit is always open
    // -----------------------------------------------------------------------

    section(5, "Withdrawals Are Never Gated");
    subsection("Alice exits in full, frozen or not...");

    vault
        .withdraw(&alice, &alice, &alice, 250)
        .expect("exit always open");

    println!();
    balance_row("Alice", vault.balance_of(&alice), vault.asset_balance_of(&alice), BLUE);
    balance_row("Bob", vault.balance_of(&bob), vault.asset_balance_of(&bob), GREEN);

    info("Total supply", &vault.total_supply().to_string());
    info("Assets in custody", &vault.total_assets().to_string());
    info("Events recorded", &vault.events().len().to_string());
    assert!(vault.total_supply() <= vault.total_assets());
    success("Solvency holds: every share is backed in custody");

    println!();
    println!("  {BOLD}{GREEN}Walkthrough complete.{RESET}");
    println!();
}
