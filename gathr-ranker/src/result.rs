//! Output of a feed request.

use gathr_core::ScoredActivity;
use serde::{Deserialize, Serialize};

use crate::meta::FeedMeta;

/// Suggestion added when the personalised feed is empty.
pub const NO_ACTIVITIES_SUGGESTION: &str = "No activities found for the selected date.";
/// Follow-up suggestion added alongside [`NO_ACTIVITIES_SUGGESTION`].
pub const WIDEN_SEARCH_SUGGESTION: &str = "Try a different date or expand to nearby hubs.";
/// Suggestion added when every returned activity is full.
pub const ALL_FULL_SUGGESTION: &str =
    "All current activities are full. Join the waitlist or check tomorrow.";
/// Suggestion returned when no hub could be resolved.
pub const SET_HOME_HUB_SUGGESTION: &str =
    "Set a home hub to unlock personalized recommendations";

/// A ranked feed together with presentation hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedComputationResult {
    /// Ranked activities, best first.
    pub activities: Vec<ScoredActivity>,
    /// Whether the non-personalised fallback produced the list.
    pub fallback_used: bool,
    /// Hints shown when the feed is thin.
    pub suggestions: Vec<String>,
    /// Summary of the leading activities.
    pub feed_meta: FeedMeta,
}

impl FeedComputationResult {
    /// Whether the feed holds no activities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Identifiers of the ranked activities in order.
    #[must_use]
    pub fn activity_ids(&self) -> Vec<u64> {
        self.activities.iter().map(|s| s.activity.id).collect()
    }
}
