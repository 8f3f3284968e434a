//! CLI for the exutil retry engine and order checks.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use exutil_core::config;
use exutil_core::retry::RetryBudget;
use rust_decimal::Decimal;

use commands::{parse_retry_budget, run_config, run_simulate, run_validate_order, SimulateOptions};

/// Top-level CLI for exutil.
#[derive(Debug, Parser)]
#[command(name = "exutil")]
#[command(about = "exutil: retry engine and order checks for exchange calls", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Check an order against a market minimum and optional exchange rules.
    ValidateOrder {
        /// Smallest amount the market accepts.
        #[arg(long)]
        min_amount: Decimal,
        /// Order amount.
        #[arg(long)]
        amount: Decimal,
        /// Order price.
        #[arg(long)]
        price: Decimal,
        /// Prices must be a multiple of this.
        #[arg(long)]
        price_tick: Option<Decimal>,
        /// Minimum `price * amount`.
        #[arg(long)]
        min_notional: Option<Decimal>,
    },

    /// Run the retry engine against an operation that fails N times.
    Simulate {
        /// Number of failures before the operation succeeds.
        #[arg(long, default_value = "0", value_name = "N")]
        failures: u32,
        /// Bounded retry budget of the error: never, default or a count.
        #[arg(long, default_value = "never", value_parser = parse_retry_budget)]
        retry: RetryBudget,
        /// Keep retrying after the bounded budget is spent.
        #[arg(long)]
        not_fatal: bool,
        /// Wait this long between survivable retries.
        #[arg(long, value_name = "MS")]
        backoff_ms: Option<u64>,
        /// Fail with a rate-limit error using `rate_limit_retries` from config.
        #[arg(long)]
        rate_limited: bool,
    },

    /// Show the config file location and effective backoff curve.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::ValidateOrder {
                min_amount,
                amount,
                price,
                price_tick,
                min_notional,
            } => run_validate_order(min_amount, amount, price, price_tick, min_notional)?,
            CliCommand::Simulate {
                failures,
                retry,
                not_fatal,
                backoff_ms,
                rate_limited,
            } => {
                let opts = SimulateOptions {
                    failures,
                    retry,
                    not_fatal,
                    backoff_ms,
                    rate_limited,
                };
                run_simulate(&cfg, &opts).await?;
            }
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
