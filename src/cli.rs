//! CLI argument definitions.

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `triage`.
#[derive(Debug, Parser)]
#[command(
    name = "triage",
    version,
    about = "Expire unanswered feedback requests and check release-note coverage"
)]
pub struct Cli {
    /// Repository as owner/name; defaults to GITHUB_REPOSITORY.
    #[arg(long, global = true)]
    pub repo: Option<String>,

    /// Log debug output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Close issues and pull requests whose feedback request expired.
    Feedback {
        /// Print planned actions without changing anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Check that a closed issue is covered by release notes.
    ReleaseNotes {
        /// Issue number.
        #[arg(long)]
        issue: u64,
        /// Print the chosen action without changing anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the pull requests linked to an issue.
    LinkedPrs {
        /// Issue number.
        #[arg(long)]
        issue: u64,
    },
}
