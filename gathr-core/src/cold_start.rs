//! Cold-start classification.
//!
//! A user's participation history is reduced to one of five profiles. The
//! profile is computed once per feed request and biases scoring through
//! flat bonuses and tweaked sub-score weights.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::ParticipationHistory;

/// Familiarity and recency profile of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColdStartType {
    /// Established user; no adjustment.
    #[default]
    None,
    /// No participations and no declared interests.
    NewUserNoInterests,
    /// No participations but at least one declared interest.
    NewUserWithInterests,
    /// Active user who has never taken part in the target hub.
    ReturningUserNewHub,
    /// User whose last participation is older than the inactivity window.
    InactiveUserReturning,
}

impl ColdStartType {
    /// Return the stable upper-case identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::NewUserNoInterests => "NEW_USER_NO_INTERESTS",
            Self::NewUserWithInterests => "NEW_USER_WITH_INTERESTS",
            Self::ReturningUserNewHub => "RETURNING_USER_NEW_HUB",
            Self::InactiveUserReturning => "INACTIVE_USER_RETURNING",
        }
    }
}

impl std::fmt::Display for ColdStartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default number of days without participation before a user counts as
/// inactive.
pub const DEFAULT_INACTIVITY_DAYS: i64 = 30;

/// Derive a [`ColdStartType`] from participation history.
///
/// Rules are evaluated in order and the first match wins:
///
/// 1. No participations: new user, split on interest presence.
/// 2. Last participation older than the inactivity window: inactive.
/// 3. A hub is targeted and the user never took part there: new hub.
/// 4. Otherwise no cold-start adjustment.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use gathr_core::{ColdStartClassifier, ColdStartType};
///
/// let now = NaiveDate::from_ymd_opt(2024, 1, 1)
///     .and_then(|d| d.and_hms_opt(12, 0, 0))
///     .unwrap();
/// let classifier = ColdStartClassifier::default();
/// assert_eq!(
///     classifier.classify(None, Some(7), true, now),
///     ColdStartType::NewUserWithInterests,
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColdStartClassifier {
    inactivity_window: Duration,
}

impl Default for ColdStartClassifier {
    fn default() -> Self {
        Self::new(Duration::days(DEFAULT_INACTIVITY_DAYS))
    }
}

impl ColdStartClassifier {
    /// Build a classifier with a custom inactivity window.
    #[must_use]
    pub const fn new(inactivity_window: Duration) -> Self {
        Self { inactivity_window }
    }

    /// Return the configured inactivity window.
    #[must_use]
    pub const fn inactivity_window(&self) -> Duration {
        self.inactivity_window
    }

    /// Classify a user. Absent history counts as no participations.
    #[must_use]
    pub fn classify(
        &self,
        history: Option<&ParticipationHistory>,
        hub_id: Option<u64>,
        has_interests: bool,
        now: NaiveDateTime,
    ) -> ColdStartType {
        let Some(past) = history.filter(|h| !h.is_empty()) else {
            return if has_interests {
                ColdStartType::NewUserWithInterests
            } else {
                ColdStartType::NewUserNoInterests
            };
        };

        let inactive = past
            .last_participation_at
            .is_some_and(|last| last < now - self.inactivity_window);
        if inactive {
            return ColdStartType::InactiveUserReturning;
        }

        match hub_id {
            Some(hub) if past.hub_count(hub) == 0 => ColdStartType::ReturningUserNewHub,
            _ => ColdStartType::None,
        }
    }
}
