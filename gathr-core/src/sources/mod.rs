//! Collaborators the feed reads from and writes to.
//!
//! Each trait abstracts one keyed query owned outside the ranking core:
//! candidate storage, friend counts, host trust, popularity, user profiles
//! and interaction persistence. All return [`SourceError`] on failure.

mod error;
mod provider;

pub use error::SourceError;
pub use provider::{
    ActivityStore, FeedSources, InteractionSink, MutualCountProvider, PopularityProvider,
    TrustScoreProvider, UserDirectory,
};
