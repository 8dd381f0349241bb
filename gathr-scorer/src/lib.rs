//! Personalised scoring for Gathr feed candidates.
//!
//! [`FeedScoringEngine`] implements [`gathr_core::ActivityScorer`] with a
//! weighted blend of interest, social, temporal, capacity, trust, popularity
//! and geographic signals. Every weight and threshold lives in
//! [`ScoreWeights`], which callers may load from configuration and check
//! with [`ScoreWeights::validate`].
//!
//! # Examples
//!
//! ```
//! use gathr_scorer::{FeedScoringEngine, ScoreWeights};
//!
//! let weights = ScoreWeights {
//!     near_bonus: 0.2,
//!     ..ScoreWeights::default()
//! };
//! let engine = FeedScoringEngine::try_new(weights).expect("valid weights");
//! assert_eq!(engine.weights().near_bonus, 0.2);
//! ```

#![forbid(unsafe_code)]

mod engine;
mod error;
mod weights;

pub use engine::FeedScoringEngine;
pub use error::ScoreWeightsError;
pub use weights::ScoreWeights;
