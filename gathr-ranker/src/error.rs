//! Errors surfaced by the feed ranker.

use gathr_core::{InteractionError, SourceError};
use thiserror::Error;

/// Failures returned by [`FeedRanker`](crate::FeedRanker).
///
/// Collaborator failures during the personalised pipeline never appear here;
/// they divert the request to the fallback feed instead.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The user directory has no profile for the requested user.
    #[error("user {user_id} not found")]
    UnknownUser {
        /// Requested user.
        user_id: u64,
    },
    /// Looking up the profile or recording an interaction failed.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// A submitted interaction failed validation.
    #[error("invalid feed interaction: {0}")]
    Interaction(#[from] InteractionError),
}
