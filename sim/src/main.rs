//! Staking simulator — replays scenario files against the ledger engine.

mod config;
mod error;
mod runner;
mod scenario;

use clap::Parser;
use std::path::PathBuf;

use staking_utils::{format_duration, init_logging, LogFormat};

use crate::config::SimConfig;
use crate::runner::{Outcome, Report, Simulation};
use crate::scenario::Scenario;

#[derive(Parser)]
#[command(name = "staking-sim", about = "Staking ledger scenario simulator")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reward rate in whole units per staked unit per second (e.g. "0.1").
    #[arg(long, env = "STAKING_REWARD_RATE")]
    reward_rate: Option<String>,

    /// Amount moved into the reward pool before the first step.
    #[arg(long, env = "STAKING_INITIAL_FUNDING")]
    initial_funding: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "STAKING_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "STAKING_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Replay a scenario file and print the resulting ledger state.
    Run {
        scenario: PathBuf,

        /// Print the report as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as TOML.
    PrintConfig,
}

impl Cli {
    fn effective_config(&self) -> anyhow::Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::from_toml_file(path)?,
            None => SimConfig::default(),
        };
        if let Some(rate) = &self.reward_rate {
            config.ledger.reward_rate = rate.clone();
        }
        if let Some(funding) = &self.initial_funding {
            config.ledger.initial_funding = funding.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.effective_config()?;
    init_logging(config.log_format, &config.log_level)?;
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match &cli.command {
        Command::PrintConfig => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Run { scenario, json } => {
            let scenario = Scenario::from_toml_file(scenario)?;
            let mut sim = Simulation::new(&config)?;
            let report = sim.run(&scenario)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_summary(&report);
            }
            if report.unexpected > 0 {
                anyhow::bail!("{} step(s) diverged from their expectation", report.unexpected);
            }
        }
    }
    Ok(())
}

fn print_summary(report: &Report) {
    if let Some(name) = &report.name {
        println!("scenario: {name}");
    }
    println!(
        "reward rate {} per unit per second, {} simulated",
        report.reward_rate,
        format_duration(report.elapsed_secs)
    );
    println!();
    for step in &report.steps {
        let status = match &step.outcome {
            Outcome::Ok { detail } => detail.clone(),
            Outcome::ExpectedError { reason } => format!("rejected as expected: {reason}"),
            Outcome::UnexpectedError { reason } => format!("UNEXPECTED ERROR: {reason}"),
            Outcome::MissingError { expected } => format!("MISSING ERROR: expected {expected}"),
        };
        println!(
            "  [{:>3}] t+{:<8} {:<10} {:<8} {status}",
            step.index, step.at, step.caller, step.action
        );
    }
    println!();
    println!("{:<12} {:>20} {:>20} {:>20}", "participant", "staked", "accrued", "wallet");
    for p in &report.participants {
        println!(
            "{:<12} {:>20} {:>20} {:>20}",
            p.label, p.staked, p.accrued_reward, p.wallet
        );
    }
    println!();
    println!("total staked:    {}", report.total_staked);
    println!("total accrued:   {}", report.total_accrued);
    println!("custody balance: {}", report.custody_balance);
    println!("events:          {}", report.events.len());
}
