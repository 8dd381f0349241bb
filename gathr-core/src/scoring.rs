//! Score candidate activities for a user.
//!
//! The [`ActivityScorer`] trait turns one [`ScoringContext`] into an optional
//! [`ScoredActivity`]. Scoring is a pure function of the context: the
//! orchestrator looks up every collaborator signal up front so scorers never
//! perform I/O and never mutate shared state.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::{CandidateActivity, Category, ColdStartType};

/// Primary reason shown when a scorer produced none.
pub const DEFAULT_PRIMARY_REASON: &str = "Recommended for you";

/// Trust score of an activity host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustScore {
    /// Raw score, nominally in `0..=200`.
    pub score: i32,
}

/// Aggregated engagement counters for an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PopularityMetrics {
    /// Number of users who ever joined.
    pub total_joins: u32,
}

/// Collaborator signals looked up for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CandidateSignals {
    /// Friends of the user taking part.
    pub mutual_count: i64,
    /// Trust score of the host, absent when the activity has no host.
    pub creator_trust: Option<TrustScore>,
    /// Engagement counters, when tracked.
    pub popularity: Option<PopularityMetrics>,
}

/// Immutable per-candidate snapshot handed to an [`ActivityScorer`].
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    /// User the feed is computed for.
    pub user_id: u64,
    /// Candidate under evaluation.
    pub activity: &'a CandidateActivity,
    /// Declared interests of the user.
    pub interests: &'a [Category],
    /// Current local time.
    pub now: NaiveDateTime,
    /// Cold-start profile for this request.
    pub cold_start: ColdStartType,
    /// Resolved user location.
    pub location: Option<Coord<f64>>,
    /// Resolved preferred start hour.
    pub preferred_hour: Option<u8>,
    /// Confirmed participations per category.
    pub success_counts: &'a HashMap<Category, u64>,
    /// Spots left, absent when uncapped.
    pub spots_remaining: Option<u32>,
    /// Looked-up collaborator signals.
    pub signals: CandidateSignals,
}

impl ScoringContext<'_> {
    /// Whether the user declared interest in the candidate's category.
    #[must_use]
    pub fn matches_interest(&self) -> bool {
        self.activity
            .category
            .is_some_and(|category| self.interests.contains(&category))
    }

    /// Confirmed participations in the candidate's category.
    #[must_use]
    pub fn success_count(&self) -> u64 {
        self.activity
            .category
            .and_then(|category| self.success_counts.get(&category).copied())
            .unwrap_or_default()
    }
}

/// Ordered explanation strings. The first entry is the primary reason.
///
/// # Examples
/// ```
/// use gathr_core::Reasons;
///
/// let mut reasons = Reasons::default();
/// assert_eq!(reasons.primary(), "Recommended for you");
/// reasons.push("Near you");
/// reasons.push_unique("Near you");
/// assert_eq!(reasons.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reasons(Vec<String>);

impl Reasons {
    /// Append a reason.
    pub fn push(&mut self, reason: impl Into<String>) {
        self.0.push(reason.into());
    }

    /// Append a reason unless an identical one is present.
    pub fn push_unique(&mut self, reason: &str) {
        if !self.contains(reason) {
            self.0.push(reason.to_owned());
        }
    }

    /// Whether `reason` is present.
    #[must_use]
    pub fn contains(&self, reason: &str) -> bool {
        self.0.iter().any(|r| r == reason)
    }

    /// First reason, or the default primary reason.
    #[must_use]
    pub fn primary(&self) -> &str {
        self.0.first().map_or(DEFAULT_PRIMARY_REASON, String::as_str)
    }

    /// Second reason, if any.
    #[must_use]
    pub fn secondary(&self) -> Option<&str> {
        self.0.get(1).map(String::as_str)
    }

    /// Number of reasons.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no reason was recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Reasons {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Explainability facts keyed by name.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// A candidate with its score and explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredActivity {
    /// Candidate view.
    pub activity: CandidateActivity,
    /// Score rounded to three decimals.
    pub score: f64,
    /// Ordered reasons.
    pub reasons: Reasons,
    /// Friends going, absent when none.
    pub mutual_count: Option<u32>,
    /// Spots left, absent when uncapped.
    pub spots_remaining: Option<u32>,
    /// Explainability facts.
    pub metadata: Metadata,
    /// Whether the diversity pass reduced the score.
    pub diversity_penalty_applied: bool,
}

impl ScoredActivity {
    /// Wrap an activity with an initial score and no explanation.
    #[must_use]
    pub fn new(activity: CandidateActivity, score: f64) -> Self {
        Self {
            spots_remaining: activity.spots_remaining(),
            activity,
            score,
            reasons: Reasons::default(),
            mutual_count: None,
            metadata: Metadata::new(),
            diversity_penalty_applied: false,
        }
    }

    /// Whether no spot is left.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.spots_remaining == Some(0)
    }
}

/// Produce a score for one candidate.
///
/// Implementations must be pure: identical contexts yield identical results.
/// Returning `None` drops the candidate from the feed.
///
/// # Examples
/// ```
/// use gathr_core::{ActivityScorer, ScoredActivity, ScoringContext};
///
/// struct Flat;
///
/// impl ActivityScorer for Flat {
///     fn score(&self, ctx: &ScoringContext<'_>) -> Option<ScoredActivity> {
///         Some(ScoredActivity::new(ctx.activity.clone(), 0.5))
///     }
/// }
/// ```
pub trait ActivityScorer: Send + Sync {
    /// Score the candidate described by `ctx`.
    fn score(&self, ctx: &ScoringContext<'_>) -> Option<ScoredActivity>;
}

impl<T: ActivityScorer + ?Sized> ActivityScorer for std::sync::Arc<T> {
    fn score(&self, ctx: &ScoringContext<'_>) -> Option<ScoredActivity> {
        (**self).score(ctx)
    }
}

/// Round a score to three decimals.
///
/// # Examples
/// ```
/// assert_eq!(gathr_core::round_score(0.123_56), 0.124);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "scores are published with millesimal precision"
)]
pub fn round_score(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn secondary_reason_is_second_entry() {
        let reasons: Reasons = ["Near you", "Popular plan"].into_iter().collect();
        assert_eq!(reasons.primary(), "Near you");
        assert_eq!(reasons.secondary(), Some("Popular plan"));
    }

    #[rstest]
    #[case(0.3504, 0.35)]
    #[case(0.0006, 0.001)]
    #[case(1.0, 1.0)]
    fn rounds_to_three_decimals(#[case] raw: f64, #[case] expected: f64) {
        assert!((round_score(raw) - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn scored_activity_tracks_fullness() {
        let activity = CandidateActivity::new(1, 1, "Yoga").with_capacity(4, 4, 0);
        let scored = ScoredActivity::new(activity, 0.2);
        assert!(scored.is_full());
        assert_eq!(scored.reasons.primary(), DEFAULT_PRIMARY_REASON);
    }
}
