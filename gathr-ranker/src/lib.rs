//! Feed orchestration for Gathr.
//!
//! This crate provides [`FeedRanker`], which turns a user and a hub/date
//! window into a bounded, ordered feed. It resolves targeting, fetches
//! candidates through the [`gathr_core::FeedSources`] collaborators, scores
//! each with an [`gathr_core::ActivityScorer`], then applies the diversity
//! and exploration passes before truncating to the requested limit.
//!
//! Collaborator failures inside the personalised pipeline are not errors:
//! the ranker logs them and serves an availability-ordered fallback list.
//! An empty personalised feed falls back to the next day. Results are kept
//! in a `moka` cache until they expire or are invalidated.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod cache;
mod config;
mod error;
mod fallback;
mod meta;
mod ranker;
mod rerank;
mod result;

pub use cache::{FeedCache, FeedCacheKey};
pub use config::{CacheConfig, FeedConfig, InvalidationScope};
pub use error::FeedError;
pub use fallback::fallback_feed;
pub use meta::{FeedMeta, MetaWindow};
pub use ranker::FeedRanker;
pub use rerank::{apply_diversity, blend_exploration, sort_by_score};
pub use result::{
    ALL_FULL_SUGGESTION, FeedComputationResult, NO_ACTIVITIES_SUGGESTION,
    SET_HOME_HUB_SUGGESTION, WIDEN_SEARCH_SUGGESTION,
};

#[cfg(test)]
mod tests;
