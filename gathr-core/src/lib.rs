//! Core domain types for the Gathr feed engine.
//!
//! This crate defines candidate activities, user targeting data, the
//! cold-start classifier, the scoring contract and the collaborator traits
//! the ranker queries. It performs no I/O of its own; [`MemoryDirectory`]
//! offers an in-memory implementation of every collaborator.
#![forbid(unsafe_code)]

pub mod activity;
pub mod category;
pub mod clock;
pub mod cold_start;
pub mod interaction;
pub mod memory;
pub mod profile;
pub mod scoring;
pub mod sources;

pub use activity::CandidateActivity;
pub use category::{Category, UnknownCategoryError};
pub use clock::{Clock, FixedClock, SystemClock};
pub use cold_start::{ColdStartClassifier, ColdStartType, DEFAULT_INACTIVITY_DAYS};
pub use interaction::{
    FeedAction, FeedInteraction, InteractionError, MAX_POSITION, MAX_SESSION_ID_LEN,
    RecordedInteraction,
};
pub use memory::{BASELINE_TRUST_SCORE, MemoryDirectory, MutualCountRecord, ParticipationRecord};
pub use profile::{ParticipationHistory, UserProfile};
pub use scoring::{
    ActivityScorer, CandidateSignals, DEFAULT_PRIMARY_REASON, Metadata, PopularityMetrics,
    Reasons, ScoredActivity, ScoringContext, TrustScore, round_score,
};
pub use sources::{
    ActivityStore, FeedSources, InteractionSink, MutualCountProvider, PopularityProvider,
    SourceError, TrustScoreProvider, UserDirectory,
};
