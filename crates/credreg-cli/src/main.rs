//! # credreg CLI Entry Point
//!
//! Resolves configuration, initializes tracing, and dispatches to the
//! subcommand handlers.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use credreg_cli::config::{CliConfig, LogFormat};
use credreg_cli::{issue, renew, validate, verify};
use credreg_core::SystemClock;

/// Credential registry: issue, renew, and validate identity credentials.
///
/// Every committed write is appended to a hash-chained ledger file, which
/// is verified and replayed on each invocation.
#[derive(Parser, Debug)]
#[command(name = "credreg", version, about)]
struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true, env = "CREDREG_CONFIG")]
    config: Option<PathBuf>,

    /// Ledger file. Overrides the configuration and `CREDREG_LEDGER`.
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Issue a new credential.
    Issue(issue::IssueArgs),
    /// Renew a credential for 730 days from now.
    Renew(renew::RenewArgs),
    /// Look up a credential and report whether it is valid.
    Validate(validate::ValidateArgs),
    /// Verify the ledger file's hash chain.
    VerifyLedger(verify::VerifyLedgerArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(ledger) = cli.ledger {
        config.ledger_path = ledger;
    }
    init_tracing(&config);
    tracing::debug!(?config, "configuration resolved");

    if let Err(err) = run(&cli.command, &config) {
        credreg_cli::log_failure(&err);
        return Err(err);
    }
    Ok(())
}

fn run(command: &Commands, config: &CliConfig) -> anyhow::Result<()> {
    match command {
        Commands::Issue(args) => print_json(&issue::run_issue(args, config, SystemClock)?),
        Commands::Renew(args) => print_json(&renew::run_renew(args, config, SystemClock)?),
        Commands::Validate(args) => {
            print_json(&validate::run_validate(args, config, SystemClock)?)
        }
        Commands::VerifyLedger(args) => {
            print_json(&verify::run_verify_ledger(args, config, SystemClock)?)
        }
    }
}

fn init_tracing(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("cannot render output")?;
    println!("{json}");
    Ok(())
}
