//! Facade crate for the Gathr feed ranking engine.
//!
//! This crate re-exports the domain types from `gathr-core`, the default
//! scoring engine from `gathr-scorer` and the feed orchestrator from
//! `gathr-ranker`, so callers can depend on a single crate.
//!
//! ```
//! use gathr_feed::{FeedRanker, FeedScoringEngine, MemoryDirectory};
//!
//! let directory = MemoryDirectory::from_json(
//!     r#"{ "users": [{ "id": 1, "home_hub_id": 7 }] }"#,
//! )
//! .expect("snapshot parses");
//! let ranker = FeedRanker::new(directory, FeedScoringEngine::default());
//! let feed = ranker.get_feed(1, None, None, 0).expect("known user");
//! assert!(feed.fallback_used);
//! assert!(feed.activities.is_empty());
//! ```

#![forbid(unsafe_code)]

pub use gathr_core::{
    ActivityScorer, ActivityStore, CandidateActivity, CandidateSignals, Category, Clock,
    ColdStartClassifier, ColdStartType, FeedAction, FeedInteraction, FeedSources, FixedClock,
    InteractionError, InteractionSink, MemoryDirectory, MutualCountProvider,
    ParticipationHistory, PopularityMetrics, PopularityProvider, RecordedInteraction, Reasons,
    ScoredActivity, ScoringContext, SourceError, SystemClock, TrustScore, TrustScoreProvider,
    UserDirectory, UserProfile,
};
pub use gathr_ranker::{
    CacheConfig, FeedComputationResult, FeedConfig, FeedError, FeedMeta, FeedRanker,
    InvalidationScope,
};
pub use gathr_scorer::{FeedScoringEngine, ScoreWeights, ScoreWeightsError};
