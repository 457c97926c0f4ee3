use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Review gate for GitOps repositories.
///
/// Decides which approvals a change needs by matching the edited YAML
/// documents against a rules file.
#[derive(Parser, Debug)]
#[command(name = "review-gate", about = "Review policy checks for GitOps changes")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load and validate a rules file
    Validate {
        /// Path to the rules file
        rules: PathBuf,
    },

    /// Evaluate the change between two directory trees.
    ///
    /// Exits 0 when approved, 2 when approvals are still pending.
    Check(CheckArgs),
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Rules file (default: REVIEW_GATE_RULES_PATH inside the base tree)
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Tree holding the base revision
    #[arg(long)]
    pub base: PathBuf,

    /// Tree holding the head revision
    #[arg(long)]
    pub head: PathBuf,

    /// Changed path, relative to both trees (default: every differing file)
    #[arg(long = "path")]
    pub paths: Vec<String>,

    /// Login that approved the change
    #[arg(long = "approved-by")]
    pub approved_by: Vec<String>,

    /// Team directory file (`org/team: [login, ...]`)
    #[arg(long)]
    pub teams: Option<PathBuf>,

    /// Repository owner recorded in fetch keys
    #[arg(long, default_value = "local")]
    pub owner: String,

    /// Repository name recorded in fetch keys
    #[arg(long, default_value = "local")]
    pub repo: String,

    /// Print the decision as JSON
    #[arg(long)]
    pub json: bool,
}
