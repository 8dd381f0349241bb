//! Feed command implementation for the Gathr CLI.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{NaiveDate, NaiveDateTime};
use clap::Parser;
use gathr_core::{FixedClock, MemoryDirectory};
use gathr_ranker::{FeedComputationResult, FeedConfig, FeedRanker};
use gathr_scorer::{FeedScoringEngine, ScoreWeights};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Write};

use crate::fs::{file_is_file, open_utf8_file};
use crate::{
    ARG_FEED_RANKER_CONFIG, ARG_FEED_SNAPSHOT, ARG_FEED_USER, ARG_FEED_WEIGHTS, CliError,
    ENV_FEED_SNAPSHOT, ENV_FEED_USER,
};

/// CLI arguments for the `feed` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Rank the personalised feed for one user. Users, activities, \
                 participations and social signals are read from a JSON \
                 snapshot; score weights and ranker settings may be \
                 overridden with JSON files.",
    about = "Rank a user's feed from a snapshot"
)]
#[ortho_config(prefix = "GATHR")]
pub(crate) struct FeedArgs {
    /// Path to a JSON snapshot of users, activities and signals.
    #[arg(long = ARG_FEED_SNAPSHOT, value_name = "path")]
    #[serde(default)]
    pub(crate) snapshot_path: Option<Utf8PathBuf>,
    /// User to rank the feed for.
    #[arg(long = ARG_FEED_USER, value_name = "id")]
    #[serde(default)]
    pub(crate) user_id: Option<u64>,
    /// Hub to rank; defaults to the user's home hub.
    #[arg(long = "hub", value_name = "id")]
    #[serde(default)]
    pub(crate) hub_id: Option<u64>,
    /// Target date (YYYY-MM-DD); defaults to today.
    #[arg(long, value_name = "date")]
    #[serde(default)]
    pub(crate) date: Option<NaiveDate>,
    /// Maximum number of activities; zero selects the default.
    #[arg(long, value_name = "n")]
    #[serde(default)]
    pub(crate) limit: Option<i32>,
    /// Freeze the clock at this local time (YYYY-MM-DDTHH:MM:SS).
    #[arg(long, value_name = "datetime")]
    #[serde(default)]
    pub(crate) now: Option<NaiveDateTime>,
    /// Path to a JSON file overriding score weights.
    #[arg(long = ARG_FEED_WEIGHTS, value_name = "path")]
    #[serde(default)]
    pub(crate) weights_path: Option<Utf8PathBuf>,
    /// Path to a JSON file overriding ranker settings.
    #[arg(long = ARG_FEED_RANKER_CONFIG, value_name = "path")]
    #[serde(default)]
    pub(crate) ranker_config_path: Option<Utf8PathBuf>,
}

impl FeedArgs {
    pub(crate) fn into_config(self) -> Result<FeedCommandConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        FeedCommandConfig::try_from(merged)
    }
}

/// Resolved `feed` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FeedCommandConfig {
    /// Path to the JSON snapshot.
    pub(crate) snapshot_path: Utf8PathBuf,
    /// User to rank for.
    pub(crate) user_id: u64,
    /// Requested hub.
    pub(crate) hub_id: Option<u64>,
    /// Requested date.
    pub(crate) date: Option<NaiveDate>,
    /// Requested limit; zero selects the ranker default.
    pub(crate) limit: i32,
    /// Frozen clock, if any.
    pub(crate) now: Option<NaiveDateTime>,
    /// Optional score weights file.
    pub(crate) weights_path: Option<Utf8PathBuf>,
    /// Optional ranker settings file.
    pub(crate) ranker_config_path: Option<Utf8PathBuf>,
}

impl FeedCommandConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.snapshot_path, ARG_FEED_SNAPSHOT)?;
        if let Some(path) = &self.weights_path {
            Self::require_existing(path, ARG_FEED_WEIGHTS)?;
        }
        if let Some(path) = &self.ranker_config_path {
            Self::require_existing(path, ARG_FEED_RANKER_CONFIG)?;
        }
        Ok(())
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<FeedArgs> for FeedCommandConfig {
    type Error = CliError;

    fn try_from(args: FeedArgs) -> Result<Self, Self::Error> {
        let snapshot_path = args.snapshot_path.ok_or(CliError::MissingArgument {
            field: ARG_FEED_SNAPSHOT,
            env: ENV_FEED_SNAPSHOT,
        })?;
        let user_id = args.user_id.ok_or(CliError::MissingArgument {
            field: ARG_FEED_USER,
            env: ENV_FEED_USER,
        })?;
        Ok(Self {
            snapshot_path,
            user_id,
            hub_id: args.hub_id,
            date: args.date,
            limit: args.limit.unwrap_or(0),
            now: args.now,
            weights_path: args.weights_path,
            ranker_config_path: args.ranker_config_path,
        })
    }
}

pub(crate) fn run_feed(args: FeedArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_feed_with(args, &mut stdout)
}

pub(crate) fn run_feed_with(args: FeedArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = resolve_feed_config(args)?;
    let result = execute_feed(&config)?;
    write_feed(writer, &result)
}

fn resolve_feed_config(args: FeedArgs) -> Result<FeedCommandConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

pub(crate) fn execute_feed(config: &FeedCommandConfig) -> Result<FeedComputationResult, CliError> {
    let directory: MemoryDirectory = load_json(&config.snapshot_path, ARG_FEED_SNAPSHOT)?;
    let weights: ScoreWeights = load_optional_json(config.weights_path.as_deref(), ARG_FEED_WEIGHTS)?;
    let ranker_config: FeedConfig =
        load_optional_json(config.ranker_config_path.as_deref(), ARG_FEED_RANKER_CONFIG)?;

    let engine = FeedScoringEngine::try_new(weights)?;
    let base = FeedRanker::with_config(directory, engine, ranker_config);
    let ranker = match config.now {
        Some(now) => base.with_clock(FixedClock(now)),
        None => base,
    };

    info!(
        "ranking feed for user {} from {}",
        config.user_id, config.snapshot_path
    );
    let feed = ranker.get_feed(config.user_id, config.hub_id, config.date, config.limit)?;
    Ok(feed)
}

/// Load a JSON document from disk.
pub(crate) fn load_json<T: DeserializeOwned>(
    path: &Utf8Path,
    field: &'static str,
) -> Result<T, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenInput {
        field,
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseInput {
        field,
        path: path.to_path_buf(),
        source,
    })
}

fn load_optional_json<T: DeserializeOwned + Default>(
    path: Option<&Utf8Path>,
    field: &'static str,
) -> Result<T, CliError> {
    path.map_or_else(|| Ok(T::default()), |p| load_json(p, field))
}

pub(crate) fn write_feed(writer: &mut dyn Write, feed: &FeedComputationResult) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(feed).map_err(CliError::SerialiseFeed)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteFeedOutput)?;
    writer
        .write_all(b"\n")
        .map_err(CliError::WriteFeedOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<FeedCommandConfig, CliError> {
    let merged = FeedArgs::merge_from_layers(layers).map_err(CliError::from)?;
    FeedCommandConfig::try_from(merged)
}
