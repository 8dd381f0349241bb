//! Command-line interface for ranking Gathr feeds offline.
//!
//! The `feed` command loads a JSON snapshot of users, activities and social
//! signals into a [`gathr_core::MemoryDirectory`], ranks the feed for one
//! user and prints the result as JSON.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod feed;
mod fs;

pub use error::CliError;

use feed::{FeedArgs, run_feed};

pub(crate) const ARG_FEED_SNAPSHOT: &str = "snapshot";
pub(crate) const ARG_FEED_USER: &str = "user";
pub(crate) const ARG_FEED_WEIGHTS: &str = "weights";
pub(crate) const ARG_FEED_RANKER_CONFIG: &str = "ranker-config";
pub(crate) const ENV_FEED_SNAPSHOT: &str = "GATHR_CMDS_FEED_SNAPSHOT_PATH";
pub(crate) const ENV_FEED_USER: &str = "GATHR_CMDS_FEED_USER_ID";

/// Run the Gathr CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns a [`CliError`] when arguments are invalid, inputs cannot be read
/// or the feed cannot be produced.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Feed(args) => run_feed(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "gathr",
    about = "Offline tooling for the Gathr feed ranking engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank the personalised feed for one user from a JSON snapshot.
    Feed(FeedArgs),
}

#[cfg(test)]
mod tests;
