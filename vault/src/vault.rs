//! # PrizeVault — the 1:1 vault facade
//!
//! [`PrizeVault`] is the single orchestrating type composing the external
//! capabilities (clock, eligibility oracle, prize pool) with the owned
//! state (share ledger, asset custody, limit policy, role config, event
//! log). Shares and assets convert 1:1 in both directions; "mint N shares"
//! and "deposit N assets" are the same operation.
//!
//! ## Atomicity
//!
//! Every operation is a single serialized state transition. The
//! implementation orders all fallible checks before the first state
//! mutation, so any returned error means no balance, reserve, or allowance
//! changed. The one external call that can re-enter — prize-pool
//! settlement — happens strictly before any local mutation in
//! [`claim_prize`](PrizeVault::claim_prize).
//!
//! ## Gating summary
//!
//! | operation            | eligibility check | limit check |
//! |----------------------|-------------------|-------------|
//! | deposit / mint       | receiver          | receiver    |
//! | transfer (recipient) | yes               | yes         |
//! | transfer (sender)    | no                | no          |
//! | self-transfer        | no                | no          |
//! | withdraw / redeem    | no                | no          |
//! | prize claim mint     | winner (upfront)  | bounded by headroom |

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use windfall_ledger::{
    AccountId, AssetBank, Clock, CustodyError, EligibilityOracle, LedgerError, TwabLedger,
};

use crate::admin::{AdminError, VaultConfig};
use crate::claims::{ClaimOutcome, PoolError, PrizePool};
use crate::events::{EventRecord, VaultEvent};
use crate::gate::{BalanceGate, GateError};
use crate::policy::DepositLimitPolicy;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced by vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Zero-amount deposits and withdrawals are rejected: they are no-ops
    /// and almost certainly a caller bug.
    #[error("zero-amount operations are not permitted")]
    ZeroAmount,

    /// The balance gate rejected the increase.
    #[error(transparent)]
    Gate(#[from] GateError),

    /// The share ledger rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Asset custody rejected the operation.
    #[error(transparent)]
    Custody(#[from] CustodyError),

    /// A privileged operation failed its role check.
    #[error(transparent)]
    Admin(#[from] AdminError),

    /// The prize pool rejected the settlement.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// The spender's allowance over the owner's balance is too small.
    #[error(
        "insufficient allowance: spender {spender} holds {allowance} over \
         owner {owner}, requested {requested}"
    )]
    InsufficientAllowance {
        /// The account whose balance is being drawn on.
        owner: AccountId,
        /// The account spending the allowance.
        spender: AccountId,
        /// The spender's remaining allowance.
        allowance: u64,
        /// The amount that was requested.
        requested: u64,
    },

    /// Only the configured claimer may settle prizes.
    #[error("caller {caller} is not the configured claimer")]
    CallerNotClaimer {
        /// The identity that attempted the settlement.
        caller: AccountId,
    },

    /// The pool reported a claim reward larger than the prize itself.
    #[error("claim reward {claim_reward} exceeds total prize value {total_value}")]
    RewardExceedsPrize {
        /// The full prize value reported by the pool.
        total_value: u64,
        /// The reward the pool deducted for the claim executor.
        claim_reward: u64,
    },

    /// A narrowing conversion in the claim-cap computation overflowed.
    #[error("arithmetic overflow during claim capping")]
    Arithmetic,
}

// ---------------------------------------------------------------------------
// PrizeVault
// ---------------------------------------------------------------------------

/// The pooled-prize vault: 1:1 share accounting, balance gating, and
/// proportionally capped prize claims.
pub struct PrizeVault {
    ledger: TwabLedger,
    custody: AssetBank,
    policy: DepositLimitPolicy,
    config: VaultConfig,
    /// `(owner, spender) -> remaining allowance`.
    allowances: HashMap<(AccountId, AccountId), u64>,
    oracle: Arc<dyn EligibilityOracle>,
    pool: Arc<dyn PrizePool>,
    clock: Arc<dyn Clock>,
    events: Vec<EventRecord>,
}

impl PrizeVault {
    /// Creates a vault with the given roles, initial deposit limit, and
    /// injected capabilities.
    pub fn new(
        config: VaultConfig,
        initial_limit: u64,
        oracle: Arc<dyn EligibilityOracle>,
        pool: Arc<dyn PrizePool>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ledger: TwabLedger::new(),
            custody: AssetBank::new(),
            policy: DepositLimitPolicy::new(initial_limit),
            config,
            allowances: HashMap::new(),
            oracle,
            pool,
            clock,
            events: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Conversions & queries
    // -----------------------------------------------------------------------

    /// Converts an asset amount to shares. Always the identity function:
    /// the vault holds no yield source, so one share is one asset, forever.
    pub fn to_shares(&self, assets: u64) -> u64 {
        assets
    }

    /// Converts a share amount to assets. Identity, see [`to_shares`](Self::to_shares).
    pub fn to_assets(&self, shares: u64) -> u64 {
        shares
    }

    /// Returns the share balance of `account`.
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.ledger.balance_of(account)
    }

    /// Returns the total share supply.
    pub fn total_supply(&self) -> u64 {
        self.ledger.total_supply()
    }

    /// Returns the assets held in vault custody. The solvency invariant is
    /// `total_supply() <= total_assets()` after every operation.
    pub fn total_assets(&self) -> u64 {
        self.custody.reserve()
    }

    /// Returns the external (non-custodied) asset balance of `account`.
    pub fn asset_balance_of(&self, account: &AccountId) -> u64 {
        self.custody.balance_of(account)
    }

    /// Returns the current deposit limit.
    pub fn deposit_limit(&self) -> u64 {
        self.policy.limit()
    }

    /// Returns the audit log of deposit-limit changes.
    pub fn limit_change_log(&self) -> &[crate::policy::LimitChange] {
        self.policy.change_log()
    }

    /// Returns the current role configuration.
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Returns the event log, oldest first.
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Returns the share ledger (read-only), for history inspection.
    pub fn ledger(&self) -> &TwabLedger {
        &self.ledger
    }

    /// The authoritative upper bound on what `account` may deposit right
    /// now: zero when ineligible, otherwise `max(0, limit - balance)`.
    pub fn max_deposit(&self, account: &AccountId) -> u64 {
        let now = self.clock.now();
        self.gate(now)
            .remaining_headroom(account, self.ledger.balance_of(account))
    }

    /// Identical to [`max_deposit`](Self::max_deposit) under 1:1 conversion.
    pub fn max_mint(&self, account: &AccountId) -> u64 {
        self.max_deposit(account)
    }

    /// Credits `amount` of the reference asset to `account` from outside
    /// the system (on-ramp / settlement inflow).
    pub fn fund_account(&mut self, account: &AccountId, amount: u64) -> Result<u64, VaultError> {
        Ok(self.custody.credit_account(account, amount)?)
    }

    // -----------------------------------------------------------------------
    // Deposit / withdraw
    // -----------------------------------------------------------------------

    /// Deposits `amount` of the reference asset from `caller`, minting
    /// `amount` shares to `receiver`. Returns `amount`.
    ///
    /// # Errors
    ///
    /// [`VaultError::ZeroAmount`] on zero; [`GateError::NotEligible`] /
    /// [`GateError::LimitExceeded`] via the gate;
    /// [`CustodyError::InsufficientAssets`] if the caller cannot fund the
    /// pull. No state changes on error.
    pub fn deposit(
        &mut self,
        caller: &AccountId,
        receiver: &AccountId,
        amount: u64,
    ) -> Result<u64, VaultError> {
        if amount == 0 {
            return Err(VaultError::ZeroAmount);
        }
        let now = self.clock.now();

        self.gate(now)
            .authorize_increase(receiver, self.ledger.balance_of(receiver), amount)?;
        self.ledger.mintable(receiver, amount)?;

        self.custody.collect(caller, amount)?;
        self.ledger.mint(receiver, amount, now)?;

        self.record(
            now,
            VaultEvent::Transfer {
                from: None,
                to: Some(*receiver),
                amount,
            },
        );
        info!(caller = %caller, receiver = %receiver, amount, "deposit");
        Ok(amount)
    }

    /// Mints `shares` to `receiver`, pulling the matching assets from
    /// `caller`. Under 1:1 conversion this is [`deposit`](Self::deposit) by
    /// another name.
    pub fn mint(
        &mut self,
        caller: &AccountId,
        receiver: &AccountId,
        shares: u64,
    ) -> Result<u64, VaultError> {
        self.deposit(caller, receiver, shares)
    }

    /// Burns `amount` shares from `owner` and pays `amount` of the asset to
    /// `receiver`. When `caller != owner`, spends the caller's allowance.
    ///
    /// Burns are never gated: neither eligibility nor the limit can trap
    /// funds in the vault.
    ///
    /// # Errors
    ///
    /// [`VaultError::ZeroAmount`] on zero;
    /// [`VaultError::InsufficientAllowance`] for an under-approved spender;
    /// [`LedgerError::InsufficientBalance`] if `owner` cannot cover the
    /// burn; [`CustodyError::Overflow`] if the receiver's external balance
    /// cannot absorb the payout. No state changes on error.
    pub fn withdraw(
        &mut self,
        caller: &AccountId,
        receiver: &AccountId,
        owner: &AccountId,
        amount: u64,
    ) -> Result<u64, VaultError> {
        if amount == 0 {
            return Err(VaultError::ZeroAmount);
        }
        let now = self.clock.now();

        if caller != owner {
            self.ensure_allowance(owner, caller, amount)?;
        }
        // The payout leg must be provably able to land before the burn.
        self.custody.disbursable(receiver, amount)?;

        self.ledger.burn(owner, amount, now)?;
        if caller != owner {
            self.spend_allowance(owner, caller, amount);
        }
        // Solvency guarantees the reserve covers every outstanding share.
        self.custody.disburse(receiver, amount)?;

        self.record(
            now,
            VaultEvent::Transfer {
                from: Some(*owner),
                to: None,
                amount,
            },
        );
        info!(owner = %owner, receiver = %receiver, amount, "withdraw");
        Ok(amount)
    }

    /// Redeems `shares` for assets. Under 1:1 conversion this is
    /// [`withdraw`](Self::withdraw) by another name.
    pub fn redeem(
        &mut self,
        caller: &AccountId,
        receiver: &AccountId,
        owner: &AccountId,
        shares: u64,
    ) -> Result<u64, VaultError> {
        self.withdraw(caller, receiver, owner, shares)
    }

    // -----------------------------------------------------------------------
    // Transfers & allowances
    // -----------------------------------------------------------------------

    /// Sets `spender`'s allowance over `owner`'s balance to `amount`
    /// (overwrite, not increment).
    pub fn approve(&mut self, owner: &AccountId, spender: &AccountId, amount: u64) {
        self.allowances.insert((*owner, *spender), amount);
        debug!(owner = %owner, spender = %spender, amount, "approve");
    }

    /// Returns `spender`'s remaining allowance over `owner`'s balance.
    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> u64 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    /// Moves `amount` shares from `caller` to `to`.
    ///
    /// The sender side is only balance-checked; the receiving side goes
    /// through the gate. Self-transfers skip the gate — they cause no net
    /// increase.
    pub fn transfer(
        &mut self,
        caller: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> Result<(), VaultError> {
        self.transfer_internal(caller, caller, to, amount)
    }

    /// Moves `amount` shares from `from` to `to`, spending `caller`'s
    /// allowance when `caller != from`.
    pub fn transfer_from(
        &mut self,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> Result<(), VaultError> {
        self.transfer_internal(caller, from, to, amount)
    }

    fn transfer_internal(
        &mut self,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> Result<(), VaultError> {
        let now = self.clock.now();

        if caller != from {
            self.ensure_allowance(from, caller, amount)?;
        }
        if from != to {
            self.gate(now)
                .authorize_increase(to, self.ledger.balance_of(to), amount)?;
        }

        self.ledger.transfer(from, to, amount, now)?;
        if caller != from {
            self.spend_allowance(from, caller, amount);
        }

        if from != to {
            self.record(
                now,
                VaultEvent::Transfer {
                    from: Some(*from),
                    to: Some(*to),
                    amount,
                },
            );
            info!(from = %from, to = %to, amount, "transfer");
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Administration
    // -----------------------------------------------------------------------

    /// Owner-gated: overwrites the per-account deposit limit. Takes effect
    /// immediately for headroom computation; never touches existing
    /// balances.
    pub fn set_account_deposit_limit(
        &mut self,
        caller: &AccountId,
        new_limit: u64,
    ) -> Result<(), VaultError> {
        self.config.ensure_owner(caller)?;
        let now = self.clock.now();
        let previous = self.policy.set_limit(new_limit, now);

        self.record(
            now,
            VaultEvent::LimitChanged {
                previous,
                new: new_limit,
            },
        );
        info!(previous, new = new_limit, "deposit limit changed");
        Ok(())
    }

    /// Owner-gated: reassigns the claimer role.
    pub fn set_claimer(
        &mut self,
        caller: &AccountId,
        claimer: AccountId,
    ) -> Result<(), VaultError> {
        self.config.ensure_owner(caller)?;
        VaultConfig::ensure_nonzero(&claimer)?;

        let previous = self.config.claimer;
        self.config.claimer = claimer;

        let now = self.clock.now();
        self.record(
            now,
            VaultEvent::ClaimerChanged {
                previous,
                new: claimer,
            },
        );
        info!(previous = %previous, new = %claimer, "claimer changed");
        Ok(())
    }

    /// Owner-gated: reassigns the prize excess recipient.
    pub fn set_prize_excess_recipient(
        &mut self,
        caller: &AccountId,
        recipient: AccountId,
    ) -> Result<(), VaultError> {
        self.config.ensure_owner(caller)?;
        VaultConfig::ensure_nonzero(&recipient)?;

        let previous = self.config.excess_recipient;
        self.config.excess_recipient = recipient;

        let now = self.clock.now();
        self.record(
            now,
            VaultEvent::ExcessRecipientChanged {
                previous,
                new: recipient,
            },
        );
        info!(previous = %previous, new = %recipient, "excess recipient changed");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Prize claims
    // -----------------------------------------------------------------------

    /// Settles a prize claim on behalf of `winner`, applying the
    /// proportional cap.
    ///
    /// The payout pipeline:
    ///
    /// 1. Only the configured claimer may call; the winner must be
    ///    currently verified (a claim is a balance increase like any
    ///    other).
    /// 2. The award window comes from the pool's draw schedule for `tier`.
    /// 3. `winner_twab` is the winner's time-weighted average balance over
    ///    that window.
    /// 4. Pool settlement yields `total_value`; the prize net of the claim
    ///    reward is `prize_won = total_value - claim_reward`.
    /// 5. If `winner_twab > limit`, the payout is scaled:
    ///    `capped = floor(prize_won * limit / winner_twab)`. The difference
    ///    goes to the excess recipient in the reference asset — including
    ///    the floor-rounding loss, which is never dropped.
    /// 6. Of `capped`, up to the winner's remaining headroom is minted as
    ///    shares; the rest is paid directly in the asset. Bounding the mint
    ///    by headroom keeps the gate invariant without a second
    ///    authorization.
    /// 7. The returned [`ClaimOutcome`] reports `total_value` unchanged —
    ///    capping redistributes, it does not shrink the prize.
    ///
    /// All local mutation happens after the external settlement call, so a
    /// re-entering collaborator observes a consistent pre-claim state; and
    /// every payout leg is pre-flighted before the first mutation, so a
    /// failed claim leaves vault state untouched.
    pub fn claim_prize(
        &mut self,
        caller: &AccountId,
        winner: &AccountId,
        tier: u8,
        prize_index: u32,
        claim_reward: u64,
        reward_recipient: &AccountId,
    ) -> Result<ClaimOutcome, VaultError> {
        let now = self.clock.now();

        if *caller != self.config.claimer {
            return Err(VaultError::CallerNotClaimer { caller: *caller });
        }
        let gate = BalanceGate::new(&self.policy, self.oracle.as_ref(), now);
        if !gate.is_eligible(winner) {
            return Err(GateError::NotEligible { account: *winner }.into());
        }

        let window = self.pool.draw_window(tier);
        let winner_twab = self
            .ledger
            .time_weighted_average(winner, window.start, window.end)?;

        // External settlement: the pool pays the claim reward itself and
        // moves the remainder of the prize into our custody. Reentrant
        // boundary — nothing local has been mutated yet.
        let settlement = self
            .pool
            .claim_prize(winner, tier, prize_index, claim_reward, reward_recipient)?;
        let total_value = settlement.total_value;
        let prize_won =
            total_value
                .checked_sub(claim_reward)
                .ok_or(VaultError::RewardExceedsPrize {
                    total_value,
                    claim_reward,
                })?;

        // Proportional cap: a winner whose average balance exceeded the
        // limit held more win-chance capital than policy allows, so the
        // payout scales down by limit / twab. Floor division; the loss is
        // absorbed into the excess payment below.
        let limit = self.policy.limit();
        let capped = if winner_twab > limit {
            let scaled = prize_won as u128 * limit as u128 / winner_twab as u128;
            u64::try_from(scaled).map_err(|_| VaultError::Arithmetic)?
        } else {
            prize_won
        };
        let excess = prize_won - capped;

        let headroom = gate.remaining_headroom(winner, self.ledger.balance_of(winner));
        let minted = capped.min(headroom);
        let paid_direct = capped - minted;

        // Every payout leg is pre-flighted before the first local mutation;
        // once the reserve credit lands, nothing below can fail.
        self.ledger.mintable(winner, minted)?;
        if self.config.excess_recipient == *winner {
            let assets_out = paid_direct
                .checked_add(excess)
                .ok_or(VaultError::Arithmetic)?;
            self.custody.disbursable(winner, assets_out)?;
        } else {
            self.custody.disbursable(winner, paid_direct)?;
            self.custody.disbursable(&self.config.excess_recipient, excess)?;
        }

        // Effects. The reserve receives the full net prize, then pays out
        // the direct portions; the minted portion stays behind as backing.
        self.custody.credit_reserve(prize_won)?;
        if minted > 0 {
            self.ledger.mint(winner, minted, now)?;
            self.record(
                now,
                VaultEvent::Transfer {
                    from: None,
                    to: Some(*winner),
                    amount: minted,
                },
            );
        }
        if paid_direct > 0 {
            self.custody.disburse(winner, paid_direct)?;
        }
        if excess > 0 {
            self.custody.disburse(&self.config.excess_recipient, excess)?;
        }

        let outcome = ClaimOutcome {
            claim_id: Uuid::new_v4(),
            winner: *winner,
            tier,
            total_value,
            claim_reward,
            winner_twab,
            capped_amount: capped,
            minted_to_winner: minted,
            paid_to_winner: paid_direct,
            excess_redirected: excess,
            excess_recipient: self.config.excess_recipient,
        };

        self.record(
            now,
            VaultEvent::PrizeClaimed {
                winner: *winner,
                tier,
                total_value,
                minted_to_winner: minted,
                paid_to_winner: paid_direct,
                excess_redirected: excess,
                excess_recipient: self.config.excess_recipient,
            },
        );
        info!(
            winner = %winner,
            tier,
            total_value,
            minted,
            paid_direct,
            excess,
            "prize claimed"
        );
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn gate(&self, now: chrono::DateTime<chrono::Utc>) -> BalanceGate<'_> {
        BalanceGate::new(&self.policy, self.oracle.as_ref(), now)
    }

    fn ensure_allowance(
        &self,
        owner: &AccountId,
        spender: &AccountId,
        amount: u64,
    ) -> Result<(), VaultError> {
        let allowance = self.allowance(owner, spender);
        if allowance < amount {
            return Err(VaultError::InsufficientAllowance {
                owner: *owner,
                spender: *spender,
                allowance,
                requested: amount,
            });
        }
        Ok(())
    }

    /// Only called after [`ensure_allowance`](Self::ensure_allowance)
    /// succeeded in the same operation.
    fn spend_allowance(&mut self, owner: &AccountId, spender: &AccountId, amount: u64) {
        if let Some(allowance) = self.allowances.get_mut(&(*owner, *spender)) {
            *allowance -= amount;
        }
    }

    fn record(&mut self, at: chrono::DateTime<chrono::Utc>, event: VaultEvent) {
        self.events.push(EventRecord { at, event });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use windfall_ledger::{ManualClock, VerificationRegistry};

    use crate::claims::{DrawWindow, PrizeSettlement};

    const LIMIT: u64 = 100;

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn owner() -> AccountId {
        AccountId::from_label("owner")
    }

    fn claimer() -> AccountId {
        AccountId::from_label("claimer")
    }

    fn sink() -> AccountId {
        AccountId::from_label("excess-sink")
    }

    fn alice() -> AccountId {
        AccountId::from_label("alice")
    }

    fn bob() -> AccountId {
        AccountId::from_label("bob")
    }

    /// A pool that always settles the same prize over the same window.
    struct StubPool {
        window: DrawWindow,
        total_value: u64,
    }

    impl PrizePool for StubPool {
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
                total_value: self.total_value,
            })
        }
    }

    struct Fixture {
        vault: PrizeVault,
        registry: Arc<VerificationRegistry>,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        fixture_with_pool(StubPool {
            window: DrawWindow {
                start: t0() - Duration::seconds(1_000),
                end: t0(),
            },
            total_value: 0,
        })
    }

    fn fixture_with_pool(pool: StubPool) -> Fixture {
        let registry = Arc::new(VerificationRegistry::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let config = VaultConfig::new(owner(), claimer(), sink()).unwrap();
        let vault = PrizeVault::new(
            config,
            LIMIT,
            Arc::clone(&registry) as Arc<dyn EligibilityOracle>,
            Arc::new(pool),
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        Fixture {
            vault,
            registry,
            clock,
        }
    }

    fn verify(fx: &Fixture, account: AccountId) {
        fx.registry
            .set_verified_until(account, fx.clock.now() + Duration::days(365));
    }

    fn fund(fx: &mut Fixture, account: AccountId, amount: u64) {
        fx.vault.fund_account(&account, amount).unwrap();
    }

    fn assert_solvent(vault: &PrizeVault) {
        assert!(
            vault.total_supply() <= vault.total_assets(),
            "supply {} exceeds custody {}",
            vault.total_supply(),
            vault.total_assets()
        );
    }

    // -- conversions --

    #[test]
    fn conversions_are_identity() {
        let fx = fixture();
        assert_eq!(fx.vault.to_shares(12345), 12345);
        assert_eq!(fx.vault.to_assets(12345), 12345);
    }

    // -- deposit --

    #[test]
    fn deposit_mints_shares_one_to_one() {
        let mut fx = fixture();
        verify(&fx, alice());
        fund(&mut fx, alice(), 500);

        let out = fx.vault.deposit(&alice(), &alice(), 60).unwrap();
        assert_eq!(out, 60);
        assert_eq!(fx.vault.balance_of(&alice()), 60);
        assert_eq!(fx.vault.asset_balance_of(&alice()), 440);
        assert_eq!(fx.vault.total_assets(), 60);
        assert_solvent(&fx.vault);
    }

    #[test]
    fn deposit_zero_rejected() {
        let mut fx = fixture();
        verify(&fx, alice());
        assert!(matches!(
            fx.vault.deposit(&alice(), &alice(), 0),
            Err(VaultError::ZeroAmount)
        ));
    }

    #[test]
    fn deposit_to_unverified_receiver_rejected() {
        let mut fx = fixture();
        verify(&fx, alice());
        fund(&mut fx, alice(), 500);

        let result = fx.vault.deposit(&alice(), &bob(), 10);
        assert!(matches!(
            result,
            Err(VaultError::Gate(GateError::NotEligible { .. }))
        ));
        // Nothing moved.
        assert_eq!(fx.vault.asset_balance_of(&alice()), 500);
        assert_eq!(fx.vault.total_supply(), 0);
    }

    #[test]
    fn deposit_beyond_limit_rejected() {
        let mut fx = fixture();
        verify(&fx, alice());
        fund(&mut fx, alice(), 500);
        fx.vault.deposit(&alice(), &alice(), LIMIT).unwrap();

        let result = fx.vault.deposit(&alice(), &alice(), 1);
        assert!(matches!(
            result,
            Err(VaultError::Gate(GateError::LimitExceeded { .. }))
        ));
        assert_eq!(fx.vault.balance_of(&alice()), LIMIT);
    }

    #[test]
    fn deposit_without_assets_rejected_before_mint() {
        let mut fx = fixture();
        verify(&fx, alice());

        let result = fx.vault.deposit(&alice(), &alice(), 10);
        assert!(matches!(
            result,
            Err(VaultError::Custody(CustodyError::InsufficientAssets { .. }))
        ));
        assert_eq!(fx.vault.total_supply(), 0);
    }

    #[test]
    fn mint_is_deposit_by_another_name() {
        let mut fx = fixture();
        verify(&fx, alice());
        fund(&mut fx, alice(), 100);

        fx.vault.mint(&alice(), &alice(), 40).unwrap();
        assert_eq!(fx.vault.balance_of(&alice()), 40);
        assert_eq!(fx.vault.max_mint(&alice()), LIMIT - 40);
    }

    // -- max_deposit --

    #[test]
    fn max_deposit_tracks_headroom() {
        let mut fx = fixture();
        assert_eq!(fx.vault.max_deposit(&alice()), 0); // unverified

        verify(&fx, alice());
        assert_eq!(fx.vault.max_deposit(&alice()), LIMIT);

        fund(&mut fx, alice(), 500);
        fx.vault.deposit(&alice(), &alice(), 30).unwrap();
        assert_eq!(fx.vault.max_deposit(&alice()), LIMIT - 30);
    }

    #[test]
    fn max_deposit_zero_after_verification_expires() {
        let mut fx = fixture();
        verify(&fx, alice());
        fund(&mut fx, alice(), 100);
        fx.vault.deposit(&alice(), &alice(), 10).unwrap();

        fx.clock.advance_secs(366 * 86_400);
        assert_eq!(fx.vault.max_deposit(&alice()), 0);
    }

    // -- withdraw --

    #[test]
    fn withdraw_round_trips_a_deposit() {
        let mut fx = fixture();
        verify(&fx, alice());
        fund(&mut fx, alice(), 500);

        fx.vault.deposit(&alice(), &alice(), 80).unwrap();
        fx.vault.withdraw(&alice(), &alice(), &alice(), 80).unwrap();

        assert_eq!(fx.vault.balance_of(&alice()), 0);
        assert_eq!(fx.vault.asset_balance_of(&alice()), 500);
        assert_eq!(fx.vault.total_supply(), 0);
        assert_eq!(fx.vault.total_assets(), 0);
    }

    #[test]
    fn withdraw_never_gated_by_eligibility() {
        let mut fx = fixture();
        verify(&fx, alice());
        fund(&mut fx, alice(), 500);
        fx.vault.deposit(&alice(), &alice(), 80).unwrap();

        // Verification lapses; funds must still be withdrawable.
        fx.registry.revoke(&alice());
        fx.vault.withdraw(&alice(), &alice(), &alice(), 80).unwrap();
        assert_eq!(fx.vault.asset_balance_of(&alice()), 500);
    }

    #[test]
    fn withdraw_more_than_balance_rejected() {
        let mut fx = fixture();
        verify(&fx, alice());
        fund(&mut fx, alice(), 500);
        fx.vault.deposit(&alice(), &alice(), 50).unwrap();

        let result = fx.vault.withdraw(&alice(), &alice(), &alice(), 51);
        assert!(matches!(
            result,
            Err(VaultError::Ledger(LedgerError::InsufficientBalance { .. }))
        ));
    }

    #[test]
    fn withdraw_zero_rejected() {
        let mut fx = fixture();
        assert!(matches!(
            fx.vault.withdraw(&alice(), &alice(), &alice(), 0),
            Err(VaultError::ZeroAmount)
        ));
    }

    #[test]
    fn third_party_withdraw_spends_allowance() {
        let mut fx = fixture();
        verify(&fx, alice());
        fund(&mut fx, alice(), 500);
        fx.vault.deposit(&alice(), &alice(), 80).unwrap();

        fx.vault.approve(&alice(), &bob(), 50);
        fx.vault.withdraw(&bob(), &bob(), &alice(), 30).unwrap();

        assert_eq!(fx.vault.balance_of(&alice()), 50);
        assert_eq!(fx.vault.asset_balance_of(&bob()), 30);
        assert_eq!(fx.vault.allowance(&alice(), &bob()), 20);
    }

    #[test]
    fn third_party_withdraw_without_allowance_rejected() {
        let mut fx = fixture();
        verify(&fx, alice());
        fund(&mut fx, alice(), 500);
        fx.vault.deposit(&alice(), &alice(), 80).unwrap();

        let result = fx.vault.withdraw(&bob(), &bob(), &alice(), 30);
        assert!(matches!(
            result,
            Err(VaultError::InsufficientAllowance {
                allowance: 0,
                requested: 30,
                ..
            })
        ));
        // Balance untouched.
        assert_eq!(fx.vault.balance_of(&alice()), 80);
    }

    #[test]
    fn failed_burn_does_not_spend_allowance() {
        let mut fx = fixture();
        verify(&fx, alice());
        fund(&mut fx, alice(), 500);
        fx.vault.deposit(&alice(), &alice(), 20).unwrap();
        fx.vault.approve(&alice(), &bob(), 100);

        let result = fx.vault.withdraw(&bob(), &bob(), &alice(), 50);
        assert!(result.is_err());
        assert_eq!(fx.vault.allowance(&alice(), &bob()), 100);
    }

    // -- transfers --

    #[test]
    fn transfer_gates_recipient_only() {
        let mut fx = fixture();
        verify(&fx, alice());
        verify(&fx, bob());
        fund(&mut fx, alice(), 500);
        fx.vault.deposit(&alice(), &alice(), 100).unwrap();

        // Sender's verification lapses; sending out is still allowed.
        fx.registry.revoke(&alice());
        fx.vault.transfer(&alice(), &bob(), 50).unwrap();

        assert_eq!(fx.vault.balance_of(&alice()), 50);
        assert_eq!(fx.vault.balance_of(&bob()), 50);
    }

    #[test]
    fn transfer_to_unverified_recipient_rejected() {
        let mut fx = fixture();
        verify(&fx, alice());
        fund(&mut fx, alice(), 500);
        fx.vault.deposit(&alice(), &alice(), 100).unwrap();

        let result = fx.vault.transfer(&alice(), &bob(), 50);
        assert!(matches!(
            result,
            Err(VaultError::Gate(GateError::NotEligible { .. }))
        ));
    }

    #[test]
    fn transfer_respects_recipient_headroom() {
        let mut fx = fixture();
        verify(&fx, alice());
        verify(&fx, bob());
        fund(&mut fx, alice(), 500);
        fund(&mut fx, bob(), 500);
        fx.vault.deposit(&alice(), &alice(), 100).unwrap();
        fx.vault.deposit(&bob(), &bob(), 80).unwrap();

        // Bob has 20 headroom; 30 must be rejected.
        let result = fx.vault.transfer(&alice(), &bob(), 30);
        assert!(matches!(
            result,
            Err(VaultError::Gate(GateError::LimitExceeded { .. }))
        ));
        fx.vault.transfer(&alice(), &bob(), 20).unwrap();
        assert_eq!(fx.vault.balance_of(&bob()), 100);
    }

    #[test]
    fn self_transfer_exempt_from_gate() {
        let mut fx = fixture();
        verify(&fx, alice());
        fund(&mut fx, alice(), 500);
        fx.vault.deposit(&alice(), &alice(), 100).unwrap();

        // At the limit and no longer verified: a self-transfer still works.
        fx.registry.revoke(&alice());
        fx.vault.transfer(&alice(), &alice(), 100).unwrap();
        assert_eq!(fx.vault.balance_of(&alice()), 100);
    }

    #[test]
    fn transfer_from_spends_allowance() {
        let mut fx = fixture();
        verify(&fx, alice());
        verify(&fx, bob());
        fund(&mut fx, alice(), 500);
        fx.vault.deposit(&alice(), &alice(), 100).unwrap();
        fx.vault.approve(&alice(), &bob(), 60);

        fx.vault.transfer_from(&bob(), &alice(), &bob(), 40).unwrap();
        assert_eq!(fx.vault.balance_of(&bob()), 40);
        assert_eq!(fx.vault.allowance(&alice(), &bob()), 20);

        let result = fx.vault.transfer_from(&bob(), &alice(), &bob(), 30);
        assert!(matches!(
            result,
            Err(VaultError::InsufficientAllowance { .. })
        ));
    }

    // -- admin --

    #[test]
    fn set_limit_owner_gated_and_logged() {
        let mut fx = fixture();
        fx.vault.set_account_deposit_limit(&owner(), 250).unwrap();
        assert_eq!(fx.vault.deposit_limit(), 250);
        assert_eq!(fx.vault.limit_change_log().len(), 1);

        let result = fx.vault.set_account_deposit_limit(&alice(), 500);
        assert!(matches!(
            result,
            Err(VaultError::Admin(AdminError::Unauthorized { .. }))
        ));
        assert_eq!(fx.vault.deposit_limit(), 250);
    }

    #[test]
    fn lowering_limit_freezes_but_never_claws_back() {
        let mut fx = fixture();
        verify(&fx, alice());
        fund(&mut fx, alice(), 500);
        fx.vault.deposit(&alice(), &alice(), 100).unwrap();

        fx.vault.set_account_deposit_limit(&owner(), 40).unwrap();

        // Frozen: no headroom, deposits rejected.
        assert_eq!(fx.vault.max_deposit(&alice()), 0);
        assert!(fx.vault.deposit(&alice(), &alice(), 1).is_err());
        // But the balance stands and can still leave.
        assert_eq!(fx.vault.balance_of(&alice()), 100);
        fx.vault.withdraw(&alice(), &alice(), &alice(), 100).unwrap();
    }

    #[test]
    fn set_claimer_rejects_zero_identity() {
        let mut fx = fixture();
        assert!(matches!(
            fx.vault.set_claimer(&owner(), AccountId::ZERO),
            Err(VaultError::Admin(AdminError::ZeroIdentity))
        ));

        let new_claimer = AccountId::from_label("claimer-2");
        fx.vault.set_claimer(&owner(), new_claimer).unwrap();
        assert_eq!(fx.vault.config().claimer, new_claimer);
    }

    #[test]
    fn set_excess_recipient_owner_gated() {
        let mut fx = fixture();
        let replacement = AccountId::from_label("sink-2");
        assert!(fx
            .vault
            .set_prize_excess_recipient(&alice(), replacement)
            .is_err());
        fx.vault
            .set_prize_excess_recipient(&owner(), replacement)
            .unwrap();
        assert_eq!(fx.vault.config().excess_recipient, replacement);
    }

    // -- events --

    #[test]
    fn events_capture_mints_burns_and_admin_changes() {
        let mut fx = fixture();
        verify(&fx, alice());
        fund(&mut fx, alice(), 500);

        fx.vault.deposit(&alice(), &alice(), 50).unwrap();
        fx.vault.withdraw(&alice(), &alice(), &alice(), 20).unwrap();
        fx.vault.set_account_deposit_limit(&owner(), 200).unwrap();

        let events: Vec<&VaultEvent> = fx.vault.events().iter().map(|r| &r.event).collect();
        assert_eq!(
            events[0],
            &VaultEvent::Transfer {
                from: None,
                to: Some(alice()),
                amount: 50
            }
        );
        assert_eq!(
            events[1],
            &VaultEvent::Transfer {
                from: Some(alice()),
                to: None,
                amount: 20
            }
        );
        assert_eq!(
            events[2],
            &VaultEvent::LimitChanged {
                previous: LIMIT,
                new: 200
            }
        );
    }
}
