//! Scenario files — scripted sequences of ledger operations.
//!
//! ```toml
//! [[wallets]]
//! label = "staker1"
//! balance = "10"
//!
//! [[steps]]
//! at = 0
//! caller = "staker1"
//! action = "deposit"
//! amount = "1"
//!
//! [[steps]]
//! at = 5
//! caller = "staker1"
//! action = "withdraw"
//! amount = "2"
//! expect_error = "Insufficient balance"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use staking_types::parse_units;

use crate::error::SimError;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub wallets: Vec<WalletSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// An external wallet and its opening balance (decimal units).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletSpec {
    pub label: String,
    pub balance: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Step {
    /// Seconds after the scenario start.
    pub at: u64,
    pub caller: String,
    pub action: Action,
    /// Decimal units; required for deposit, withdraw and fund.
    #[serde(default)]
    pub amount: Option<String>,
    /// Reason code the step is expected to fail with.
    #[serde(default)]
    pub expect_error: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Deposit,
    Withdraw,
    Claim,
    Exit,
    Fund,
}

impl Action {
    pub fn takes_amount(&self) -> bool {
        matches!(self, Self::Deposit | Self::Withdraw | Self::Fund)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::Claim => "claim",
            Self::Exit => "exit",
            Self::Fund => "fund",
        };
        f.pad(name)
    }
}

impl Step {
    /// The step's amount in raw units (zero when the action takes none).
    pub fn raw_amount(&self) -> Result<u128, SimError> {
        match &self.amount {
            Some(text) => parse_units(text)
                .map_err(|e| SimError::Scenario(format!("step at {}s: {e}", self.at))),
            None if self.action.takes_amount() => Err(SimError::Scenario(format!(
                "step at {}s: {} requires an amount",
                self.at, self.action
            ))),
            None => Ok(0),
        }
    }
}

impl Scenario {
    pub fn from_toml_file(path: &Path) -> Result<Self, SimError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SimError::Scenario(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a scenario.
    pub fn from_toml_str(s: &str) -> Result<Self, SimError> {
        let scenario: Self = toml::from_str(s).map_err(|e| SimError::Scenario(e.to_string()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Steps must be in time order and carry parseable amounts.
    pub fn validate(&self) -> Result<(), SimError> {
        for wallet in &self.wallets {
            parse_units(&wallet.balance).map_err(|e| {
                SimError::Scenario(format!("wallet {}: {e}", wallet.label))
            })?;
        }
        let mut last_at = 0;
        for (index, step) in self.steps.iter().enumerate() {
            if step.at < last_at {
                return Err(SimError::Scenario(format!(
                    "step {index} at {}s precedes the previous step at {last_at}s",
                    step.at
                )));
            }
            last_at = step.at;
            step.raw_amount()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = r#"
        name = "basic"

        [[wallets]]
        label = "staker1"
        balance = "10"

        [[steps]]
        at = 0
        caller = "staker1"
        action = "deposit"
        amount = "1"

        [[steps]]
        at = 5
        caller = "staker1"
        action = "claim"
    "#;

    #[test]
    fn parses_wallets_and_steps() {
        let scenario = Scenario::from_toml_str(BASIC).unwrap();
        assert_eq!(scenario.name.as_deref(), Some("basic"));
        assert_eq!(scenario.wallets.len(), 1);
        assert_eq!(scenario.steps[0].action, Action::Deposit);
        assert_eq!(scenario.steps[1].raw_amount().unwrap(), 0);
    }

    #[test]
    fn rejects_out_of_order_steps() {
        let toml = r#"
            [[steps]]
            at = 10
            caller = "a"
            action = "claim"

            [[steps]]
            at = 5
            caller = "a"
            action = "claim"
        "#;
        assert!(matches!(Scenario::from_toml_str(toml), Err(SimError::Scenario(_))));
    }

    #[test]
    fn deposit_requires_amount() {
        let toml = r#"
            [[steps]]
            at = 0
            caller = "a"
            action = "deposit"
        "#;
        let err = Scenario::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("requires an amount"));
    }

    #[test]
    fn rejects_unknown_action_and_bad_amount() {
        let unknown = r#"
            [[steps]]
            at = 0
            caller = "a"
            action = "borrow"
        "#;
        assert!(Scenario::from_toml_str(unknown).is_err());

        let negative = r#"
            [[steps]]
            at = 0
            caller = "a"
            action = "withdraw"
            amount = "-1"
        "#;
        assert!(Scenario::from_toml_str(negative).is_err());
    }
}
