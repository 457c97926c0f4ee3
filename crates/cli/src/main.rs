mod check;
mod cli;
mod tree;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use review_gate_core::config::load_dotenv;
use review_gate_core::GateConfig;
use tracing::info;

use crate::cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    load_dotenv();
    let config = GateConfig::from_env();
    config.log_summary();

    match args.command {
        Command::Validate { rules } => {
            let set = check::validate(&rules)?;
            println!(
                "{}: {} rules, default reviewer {}",
                rules.display(),
                set.items.len(),
                set.default_reviewer
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Check(check_args) => {
            let report = check::check(&check_args, &config).await?;
            if check_args.json {
                let json = serde_json::to_string_pretty(&report).context("failed to encode report")?;
                println!("{json}");
            } else {
                println!("{}", check::render(&report));
            }

            if report.decision.is_approved() {
                Ok(ExitCode::SUCCESS)
            } else {
                info!(pending = ?report.decision.pending_reviewers(), "approvals pending");
                Ok(ExitCode::from(2))
            }
        }
    }
}
