//! Replays a scenario against a fresh ledger and in-memory custody.

use serde::Serialize;
use std::collections::BTreeMap;

use staking_ledger::{LedgerError, LedgerEvent, MemoryCustody, StakingLedger};
use staking_types::{format_units, parse_units, Address, Timestamp};

use crate::config::SimConfig;
use crate::error::SimError;
use crate::scenario::{Action, Scenario, Step};

/// Label of the wallet that provides the configured initial funding.
pub const OPERATOR: &str = "operator";

/// What happened when a step ran, judged against its expectation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Ok { detail: String },
    ExpectedError { reason: String },
    UnexpectedError { reason: String },
    MissingError { expected: String },
}

impl Outcome {
    pub fn is_unexpected(&self) -> bool {
        matches!(self, Self::UnexpectedError { .. } | Self::MissingError { .. })
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub at: u64,
    pub caller: String,
    pub action: Action,
    pub outcome: Outcome,
}

#[derive(Clone, Debug, Serialize)]
pub struct ParticipantReport {
    pub label: String,
    pub address: String,
    pub staked: String,
    pub accrued_reward: String,
    pub wallet: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct EventLine {
    pub event: &'static str,
    pub who: String,
    pub amount: String,
}

/// Result of a full scenario run.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub name: Option<String>,
    pub reward_rate: String,
    pub elapsed_secs: u64,
    pub steps: Vec<StepReport>,
    pub participants: Vec<ParticipantReport>,
    pub events: Vec<EventLine>,
    pub total_staked: String,
    pub total_accrued: String,
    pub custody_balance: String,
    pub unexpected: usize,
}

/// A ledger wired to an in-memory custody and a label→address book.
pub struct Simulation {
    ledger: StakingLedger,
    custody: MemoryCustody,
    start: Timestamp,
    labels: BTreeMap<String, Address>,
}

impl Simulation {
    /// Build the ledger from config and move any initial funding into the
    /// reward pool from the operator wallet.
    pub fn new(config: &SimConfig) -> Result<Self, SimError> {
        let mut sim = Self {
            ledger: StakingLedger::from_config(&config.ledger)?,
            custody: MemoryCustody::new(),
            start: Timestamp::new(config.start_time),
            labels: BTreeMap::new(),
        };
        let funding = config.ledger.initial_funding()?;
        if funding > 0 {
            let operator = sim.address_of(OPERATOR);
            sim.custody.credit_wallet(&operator, funding)?;
            sim.ledger.fund(&mut sim.custody, &operator, funding)?;
            tracing::info!(amount = %format_units(funding), "reward pool funded at startup");
        }
        Ok(sim)
    }

    pub fn ledger(&self) -> &StakingLedger {
        &self.ledger
    }

    pub fn custody(&self) -> &MemoryCustody {
        &self.custody
    }

    fn address_of(&mut self, label: &str) -> Address {
        *self
            .labels
            .entry(label.to_string())
            .or_insert_with(|| Address::from_label(label))
    }

    /// Run every step, checking the ledger invariants after each one.
    ///
    /// A step that fails differently from its expectation is reported, not
    /// fatal. An invariant breach aborts the run.
    pub fn run(&mut self, scenario: &Scenario) -> Result<Report, SimError> {
        scenario.validate()?;
        for wallet in &scenario.wallets {
            let who = self.address_of(&wallet.label);
            let balance = parse_units(&wallet.balance)
                .map_err(|e| SimError::Scenario(format!("wallet {}: {e}", wallet.label)))?;
            self.custody.credit_wallet(&who, balance)?;
        }

        let mut steps = Vec::with_capacity(scenario.steps.len());
        for (index, step) in scenario.steps.iter().enumerate() {
            let outcome = self.apply(step)?;
            self.ledger.check_invariants(&self.custody)?;
            if outcome.is_unexpected() {
                tracing::warn!(index, caller = %step.caller, action = %step.action, ?outcome, "step diverged from expectation");
            } else {
                tracing::info!(index, caller = %step.caller, action = %step.action, ?outcome, "step applied");
            }
            steps.push(StepReport {
                index,
                at: step.at,
                caller: step.caller.clone(),
                action: step.action,
                outcome,
            });
        }

        Ok(self.report(scenario, steps))
    }

    fn apply(&mut self, step: &Step) -> Result<Outcome, SimError> {
        let caller = self.address_of(&step.caller);
        let now = self.start.plus(step.at);
        let amount = step.raw_amount()?;
        let custody = &mut self.custody;

        let result: Result<String, LedgerError> = match step.action {
            Action::Deposit => self
                .ledger
                .deposit(custody, &caller, amount, now)
                .map(|()| format!("staked {}", format_units(amount))),
            Action::Withdraw => self
                .ledger
                .withdraw(custody, &caller, amount, now)
                .map(|()| format!("withdrew {}", format_units(amount))),
            Action::Claim => self
                .ledger
                .claim_reward(custody, &caller, now)
                .map(|reward| format!("claimed {}", format_units(reward))),
            Action::Exit => self
                .ledger
                .exit(custody, &caller, now)
                .map(|(principal, reward)| {
                    format!(
                        "exited with {} principal and {} reward",
                        format_units(principal),
                        format_units(reward)
                    )
                }),
            Action::Fund => self
                .ledger
                .fund(custody, &caller, amount)
                .map(|()| format!("funded {}", format_units(amount))),
        };

        Ok(match (result, &step.expect_error) {
            (Ok(detail), None) => Outcome::Ok { detail },
            (Ok(_), Some(expected)) => Outcome::MissingError {
                expected: expected.clone(),
            },
            (Err(e), Some(expected)) if e.reason() == expected => Outcome::ExpectedError {
                reason: e.reason().to_string(),
            },
            (Err(e), _) => Outcome::UnexpectedError {
                reason: e.to_string(),
            },
        })
    }

    fn report(&self, scenario: &Scenario, steps: Vec<StepReport>) -> Report {
        let by_address: BTreeMap<Address, &str> = self
            .labels
            .iter()
            .map(|(label, address)| (*address, label.as_str()))
            .collect();
        let name_of = |address: &Address| {
            by_address
                .get(address)
                .map_or_else(|| address.to_string(), |label| label.to_string())
        };

        let participants = self
            .labels
            .iter()
            .map(|(label, address)| ParticipantReport {
                label: label.clone(),
                address: address.to_string(),
                staked: format_units(self.ledger.staked_balance(address)),
                accrued_reward: format_units(self.ledger.accrued_reward(address)),
                wallet: format_units(self.custody.wallet_balance(address)),
            })
            .collect();

        let events = self
            .ledger
            .events()
            .iter()
            .map(|event| {
                let (who, amount) = match event {
                    LedgerEvent::Deposited { account, amount }
                    | LedgerEvent::Withdrawn { account, amount }
                    | LedgerEvent::RewardPaid { account, amount } => (account, amount),
                    LedgerEvent::Funded { funder, amount } => (funder, amount),
                };
                EventLine {
                    event: event.name(),
                    who: name_of(who),
                    amount: format_units(*amount),
                }
            })
            .collect();

        let unexpected = steps.iter().filter(|s| s.outcome.is_unexpected()).count();
        Report {
            name: scenario.name.clone(),
            reward_rate: self.ledger.reward_rate().to_string(),
            elapsed_secs: scenario.steps.last().map_or(0, |s| s.at),
            steps,
            participants,
            events,
            total_staked: format_units(self.ledger.total_staked()),
            total_accrued: format_units(self.ledger.total_accrued()),
            custody_balance: format_units(staking_ledger::Custody::balance(&self.custody)),
            unexpected,
        }
    }
}
