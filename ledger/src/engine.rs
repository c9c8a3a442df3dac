//! Core ledger engine.

use crate::account::ParticipantAccount;
use crate::accrual::{self, Settlement};
use crate::config::LedgerConfig;
use crate::custody::Custody;
use crate::error::{
    LedgerError, CANNOT_FUND_ZERO, CANNOT_STAKE_ZERO, CANNOT_WITHDRAW_ZERO, NOTHING_TO_EXIT,
    NO_REWARD_TO_CLAIM,
};
use crate::event::{EventBus, LedgerEvent};
use crate::snapshot::{AccountSnapshot, LedgerSnapshot};
use staking_types::{Address, RewardRate, Timestamp};
use std::collections::HashMap;

/// The staking ledger. Owns every balance and applies operations one at a
/// time.
///
/// Each mutating call computes its full post-state first, performs the
/// custody call, and commits only if custody succeeded. A failed call leaves
/// the ledger exactly as it was.
///
/// Invariants held between calls:
/// - `total_staked == Σ principal`
/// - `total_accrued == Σ accrued_reward`
/// - `custody.balance() >= total_staked + total_accrued`
/// - `last_accrual` never decreases for any account
pub struct StakingLedger {
    reward_rate: RewardRate,
    total_staked: u128,
    total_accrued: u128,
    accounts: HashMap<Address, ParticipantAccount>,
    events: Vec<LedgerEvent>,
    bus: EventBus,
}

impl StakingLedger {
    pub fn new(reward_rate: RewardRate) -> Self {
        Self {
            reward_rate,
            total_staked: 0,
            total_accrued: 0,
            accounts: HashMap::new(),
            events: Vec::new(),
            bus: EventBus::new(),
        }
    }

    /// Build a ledger from configuration, rejecting a malformed or negative rate.
    pub fn from_config(config: &LedgerConfig) -> Result<Self, LedgerError> {
        Ok(Self::new(config.reward_rate()?))
    }

    // ── Mutating operations ────────────────────────────────────────────

    /// Deposit `amount` of principal for `caller`.
    ///
    /// Settles the caller's reward on the pre-deposit principal, then pulls
    /// the asset into custody.
    pub fn deposit(
        &mut self,
        custody: &mut dyn Custody,
        caller: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount(CANNOT_STAKE_ZERO));
        }
        let current = self
            .accounts
            .get(caller)
            .cloned()
            .unwrap_or_else(|| ParticipantAccount::opened_at(now));
        let settled = self.settle(&current, now, &*custody)?;

        let mut next = settled.account;
        next.principal = next
            .principal
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let total_accrued = self
            .total_accrued
            .checked_add(settled.credited)
            .ok_or(LedgerError::Overflow)?;

        if let Err(e) = custody.receive(caller, amount) {
            tracing::warn!(caller = %caller, amount, error = %e, "deposit rejected by custody");
            return Err(e.into());
        }

        self.commit(caller, next, total_staked, total_accrued);
        self.emit(LedgerEvent::Deposited {
            account: *caller,
            amount,
        });
        tracing::debug!(
            caller = %caller,
            amount,
            total_staked = self.total_staked,
            "deposit accepted"
        );
        Ok(())
    }

    /// Withdraw `amount` of principal back to `caller`.
    pub fn withdraw(
        &mut self,
        custody: &mut dyn Custody,
        caller: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount(CANNOT_WITHDRAW_ZERO));
        }
        let current = self.account_or_insufficient(caller, amount)?;
        if current.principal < amount {
            return Err(LedgerError::InsufficientBalance {
                requested: amount,
                available: current.principal,
            });
        }
        let settled = self.settle(&current, now, &*custody)?;

        let mut next = settled.account;
        next.principal -= amount;
        let total_staked = self
            .total_staked
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow)?;
        let total_accrued = self
            .total_accrued
            .checked_add(settled.credited)
            .ok_or(LedgerError::Overflow)?;

        if let Err(e) = custody.transfer(caller, amount) {
            tracing::warn!(caller = %caller, amount, error = %e, "withdrawal payout failed");
            return Err(e.into());
        }

        self.commit(caller, next, total_staked, total_accrued);
        self.emit(LedgerEvent::Withdrawn {
            account: *caller,
            amount,
        });
        tracing::debug!(
            caller = %caller,
            amount,
            total_staked = self.total_staked,
            "withdrawal paid"
        );
        Ok(())
    }

    /// Pay out everything `caller` has earned up to `now`.
    pub fn claim_reward(
        &mut self,
        custody: &mut dyn Custody,
        caller: &Address,
        now: Timestamp,
    ) -> Result<u128, LedgerError> {
        let current = self
            .accounts
            .get(caller)
            .cloned()
            .ok_or(LedgerError::InvalidAmount(NO_REWARD_TO_CLAIM))?;
        let settled = self.settle(&current, now, &*custody)?;

        let mut next = settled.account;
        let reward = next.accrued_reward;
        if reward == 0 {
            return Err(LedgerError::InvalidAmount(NO_REWARD_TO_CLAIM));
        }
        next.accrued_reward = 0;
        let total_accrued = self
            .total_accrued
            .checked_add(settled.credited)
            .and_then(|t| t.checked_sub(reward))
            .ok_or(LedgerError::Overflow)?;

        if let Err(e) = custody.transfer(caller, reward) {
            tracing::warn!(caller = %caller, reward, error = %e, "reward payout failed");
            return Err(e.into());
        }

        self.commit(caller, next, self.total_staked, total_accrued);
        self.emit(LedgerEvent::RewardPaid {
            account: *caller,
            amount: reward,
        });
        tracing::debug!(caller = %caller, reward, "reward paid");
        Ok(reward)
    }

    /// Withdraw all principal and claim all reward in one payout.
    ///
    /// Returns `(principal, reward)` paid.
    pub fn exit(
        &mut self,
        custody: &mut dyn Custody,
        caller: &Address,
        now: Timestamp,
    ) -> Result<(u128, u128), LedgerError> {
        let current = self
            .accounts
            .get(caller)
            .cloned()
            .ok_or(LedgerError::InvalidAmount(NOTHING_TO_EXIT))?;
        let settled = self.settle(&current, now, &*custody)?;

        let mut next = settled.account;
        let (principal, reward) = (next.principal, next.accrued_reward);
        if principal == 0 && reward == 0 {
            return Err(LedgerError::InvalidAmount(NOTHING_TO_EXIT));
        }
        next.principal = 0;
        next.accrued_reward = 0;
        let payout = principal.checked_add(reward).ok_or(LedgerError::Overflow)?;
        let total_staked = self
            .total_staked
            .checked_sub(principal)
            .ok_or(LedgerError::Overflow)?;
        let total_accrued = self
            .total_accrued
            .checked_add(settled.credited)
            .and_then(|t| t.checked_sub(reward))
            .ok_or(LedgerError::Overflow)?;

        if let Err(e) = custody.transfer(caller, payout) {
            tracing::warn!(caller = %caller, payout, error = %e, "exit payout failed");
            return Err(e.into());
        }

        self.commit(caller, next, total_staked, total_accrued);
        if principal > 0 {
            self.emit(LedgerEvent::Withdrawn {
                account: *caller,
                amount: principal,
            });
        }
        if reward > 0 {
            self.emit(LedgerEvent::RewardPaid {
                account: *caller,
                amount: reward,
            });
        }
        tracing::debug!(caller = %caller, principal, reward, "account exited");
        Ok((principal, reward))
    }

    /// Top up the reward pool from `funder`.
    ///
    /// Funding creates no account and earns nothing; it only raises the
    /// budget future settlements may credit.
    pub fn fund(
        &mut self,
        custody: &mut dyn Custody,
        funder: &Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount(CANNOT_FUND_ZERO));
        }
        if let Err(e) = custody.receive(funder, amount) {
            tracing::warn!(funder = %funder, amount, error = %e, "funding rejected by custody");
            return Err(e.into());
        }
        self.emit(LedgerEvent::Funded {
            funder: *funder,
            amount,
        });
        tracing::debug!(funder = %funder, amount, "reward pool funded");
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// Deposited principal of `address`; zero if unknown.
    pub fn staked_balance(&self, address: &Address) -> u128 {
        self.accounts.get(address).map_or(0, |a| a.principal)
    }

    pub fn total_staked(&self) -> u128 {
        self.total_staked
    }

    pub fn reward_rate(&self) -> RewardRate {
        self.reward_rate
    }

    /// Reward credited by past settlements and not yet paid.
    pub fn accrued_reward(&self, address: &Address) -> u128 {
        self.accounts.get(address).map_or(0, |a| a.accrued_reward)
    }

    /// Sum of all accrued, unpaid reward.
    pub fn total_accrued(&self) -> u128 {
        self.total_accrued
    }

    /// What `address` could claim at `now`: settled reward plus what a
    /// settlement at `now` would credit. Does not mutate.
    pub fn pending_reward(&self, address: &Address, now: Timestamp, custody: &dyn Custody) -> u128 {
        let Some(account) = self.accounts.get(address) else {
            return 0;
        };
        accrual::settle(account, self.reward_rate, now, self.reward_budget(custody))
            .map_or(account.accrued_reward, |settled| settled.account.accrued_reward)
    }

    pub fn account(&self, address: &Address) -> Option<&ParticipantAccount> {
        self.accounts.get(address)
    }

    /// Number of accounts ever opened.
    pub fn participants(&self) -> usize {
        self.accounts.len()
    }

    /// Principal plus accrued reward the ledger owes.
    pub fn obligations(&self) -> u128 {
        self.total_staked.saturating_add(self.total_accrued)
    }

    /// Custody holdings not yet promised to anyone.
    pub fn reward_budget(&self, custody: &dyn Custody) -> u128 {
        custody.balance().saturating_sub(self.obligations())
    }

    /// Verify the accounting invariants against `custody`.
    pub fn check_invariants(&self, custody: &dyn Custody) -> Result<(), LedgerError> {
        let mut principal_sum: u128 = 0;
        let mut reward_sum: u128 = 0;
        for account in self.accounts.values() {
            principal_sum = principal_sum
                .checked_add(account.principal)
                .ok_or(LedgerError::Overflow)?;
            reward_sum = reward_sum
                .checked_add(account.accrued_reward)
                .ok_or(LedgerError::Overflow)?;
        }
        if principal_sum != self.total_staked {
            return Err(LedgerError::InvariantViolation(format!(
                "total_staked {} != sum of principal {}",
                self.total_staked, principal_sum
            )));
        }
        if reward_sum != self.total_accrued {
            return Err(LedgerError::InvariantViolation(format!(
                "total_accrued {} != sum of accrued reward {}",
                self.total_accrued, reward_sum
            )));
        }
        let owed = self
            .total_staked
            .checked_add(self.total_accrued)
            .ok_or(LedgerError::Overflow)?;
        if custody.balance() < owed {
            return Err(LedgerError::InvariantViolation(format!(
                "custody {} below obligations {}",
                custody.balance(),
                owed
            )));
        }
        Ok(())
    }

    // ── Events ─────────────────────────────────────────────────────────

    /// Every event emitted so far, oldest first.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Take the event log, leaving it empty.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Register a listener invoked synchronously for each new event.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.bus.subscribe(listener);
    }

    // ── Persistence ────────────────────────────────────────────────────

    /// Capture the full ledger state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let accounts = self
            .accounts
            .iter()
            .map(|(address, account)| AccountSnapshot {
                address: *address,
                principal: account.principal,
                accrued_reward: account.accrued_reward,
                last_accrual: account.last_accrual,
            })
            .collect();
        LedgerSnapshot::create(
            self.reward_rate,
            self.total_staked,
            self.total_accrued,
            accounts,
        )
    }

    /// Rebuild a ledger from a snapshot after checking its integrity.
    ///
    /// The event log and subscribers start empty.
    pub fn restore(snapshot: &LedgerSnapshot) -> Result<Self, LedgerError> {
        if !snapshot.verify() {
            return Err(LedgerError::CorruptSnapshot("hash mismatch".into()));
        }
        let mut accounts = HashMap::with_capacity(snapshot.accounts.len());
        let mut principal_sum: u128 = 0;
        let mut reward_sum: u128 = 0;
        for entry in &snapshot.accounts {
            principal_sum = principal_sum
                .checked_add(entry.principal)
                .ok_or(LedgerError::Overflow)?;
            reward_sum = reward_sum
                .checked_add(entry.accrued_reward)
                .ok_or(LedgerError::Overflow)?;
            let account = ParticipantAccount {
                principal: entry.principal,
                accrued_reward: entry.accrued_reward,
                last_accrual: entry.last_accrual,
            };
            if accounts.insert(entry.address, account).is_some() {
                return Err(LedgerError::CorruptSnapshot(format!(
                    "duplicate account {}",
                    entry.address
                )));
            }
        }
        if principal_sum != snapshot.total_staked || reward_sum != snapshot.total_accrued {
            return Err(LedgerError::CorruptSnapshot(
                "totals disagree with account entries".into(),
            ));
        }
        tracing::info!(
            accounts = accounts.len(),
            total_staked = snapshot.total_staked,
            "ledger restored from snapshot"
        );
        Ok(Self {
            reward_rate: snapshot.reward_rate,
            total_staked: snapshot.total_staked,
            total_accrued: snapshot.total_accrued,
            accounts,
            events: Vec::new(),
            bus: EventBus::new(),
        })
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn settle(
        &self,
        account: &ParticipantAccount,
        now: Timestamp,
        custody: &dyn Custody,
    ) -> Result<Settlement, LedgerError> {
        let settled = accrual::settle(account, self.reward_rate, now, self.reward_budget(custody))?;
        if settled.forfeited() > 0 {
            tracing::warn!(
                earned = settled.earned,
                credited = settled.credited,
                "reward pool exhausted; earned reward capped"
            );
        } else {
            tracing::trace!(earned = settled.earned, %now, "settled accrual");
        }
        Ok(settled)
    }

    fn account_or_insufficient(
        &self,
        caller: &Address,
        requested: u128,
    ) -> Result<ParticipantAccount, LedgerError> {
        self.accounts
            .get(caller)
            .cloned()
            .ok_or(LedgerError::InsufficientBalance {
                requested,
                available: 0,
            })
    }

    fn commit(
        &mut self,
        caller: &Address,
        account: ParticipantAccount,
        total_staked: u128,
        total_accrued: u128,
    ) {
        self.accounts.insert(*caller, account);
        self.total_staked = total_staked;
        self.total_accrued = total_accrued;
    }

    fn emit(&mut self, event: LedgerEvent) {
        self.bus.emit(&event);
        self.events.push(event);
    }
}
