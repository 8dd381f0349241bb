//! User targeting data: profile preferences and participation history.
//!
//! The feed resolves everything it needs about a user from these two values.
//! Resolution helpers never fail; missing data falls through to the next
//! source and finally to a caller-supplied default.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::Category;

/// Latest hour of the day accepted as a preferred start hour.
pub const LAST_HOUR: u8 = 23;

/// Stored preferences for a user.
///
/// # Examples
/// ```
/// use gathr_core::{Category, UserProfile};
///
/// let profile = UserProfile::new(42)
///     .with_home_hub(7)
///     .with_interests(vec![Category::Sports]);
/// assert!(profile.has_interests());
/// assert_eq!(profile.home_hub_id, Some(7));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    /// User identifier.
    pub id: u64,
    /// Hub the user calls home.
    #[serde(default)]
    pub home_hub_id: Option<u64>,
    /// Last reported device position.
    #[serde(default)]
    pub live_location: Option<Coord<f64>>,
    /// Saved home position.
    #[serde(default)]
    pub home_location: Option<Coord<f64>>,
    /// Declared interest categories.
    #[serde(default)]
    pub interests: Vec<Category>,
    /// Explicit preferred start hour, unclamped as stored.
    #[serde(default)]
    pub preferred_start_hour: Option<i32>,
}

impl UserProfile {
    /// Construct an empty profile for `id`.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Set the home hub while returning `self` for chaining.
    #[must_use]
    pub const fn with_home_hub(mut self, hub_id: u64) -> Self {
        self.home_hub_id = Some(hub_id);
        self
    }

    /// Replace the interests while returning `self` for chaining.
    #[must_use]
    pub fn with_interests(mut self, interests: Vec<Category>) -> Self {
        self.interests = interests;
        self
    }

    /// Set the live location while returning `self` for chaining.
    #[must_use]
    pub const fn with_live_location(mut self, location: Coord<f64>) -> Self {
        self.live_location = Some(location);
        self
    }

    /// Whether any interest category was declared.
    #[must_use]
    pub fn has_interests(&self) -> bool {
        !self.interests.is_empty()
    }

    /// Live location, else home location.
    #[must_use]
    pub fn resolved_location(&self) -> Option<Coord<f64>> {
        self.live_location.or(self.home_location)
    }

    /// Resolve the hour of day the user prefers activities to start.
    ///
    /// The explicit preference wins and is clamped to `0..=23`. Otherwise the
    /// rounded historical average is used, also clamped. When neither exists
    /// `default_hour` is returned.
    ///
    /// # Examples
    /// ```
    /// use gathr_core::{ParticipationHistory, UserProfile};
    ///
    /// let mut profile = UserProfile::new(1);
    /// assert_eq!(profile.preferred_hour(None, 19), 19);
    ///
    /// let history = ParticipationHistory {
    ///     average_start_hour: Some(17.6),
    ///     ..ParticipationHistory::default()
    /// };
    /// assert_eq!(profile.preferred_hour(Some(&history), 19), 18);
    ///
    /// profile.preferred_start_hour = Some(30);
    /// assert_eq!(profile.preferred_hour(Some(&history), 19), 23);
    /// ```
    #[must_use]
    pub fn preferred_hour(&self, history: Option<&ParticipationHistory>, default_hour: u8) -> u8 {
        if let Some(explicit) = self.preferred_start_hour {
            return clamp_hour(i64::from(explicit));
        }
        history
            .and_then(|h| h.average_start_hour)
            .filter(|average| average.is_finite())
            .map_or(default_hour, |average| clamp_hour(round_hour(average)))
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "the average is finite and clamped immediately afterwards"
)]
fn round_hour(average: f64) -> i64 {
    average.round() as i64
}

fn clamp_hour(hour: i64) -> u8 {
    u8::try_from(hour.clamp(0, i64::from(LAST_HOUR))).unwrap_or(LAST_HOUR)
}

/// Aggregated participation facts for a user.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParticipationHistory {
    /// Number of activities the user has taken part in.
    pub total_count: u64,
    /// Timestamp of the most recent participation.
    pub last_participation_at: Option<NaiveDateTime>,
    /// Participation counts keyed by hub identifier.
    pub per_hub_counts: HashMap<u64, u64>,
    /// Confirmed participation counts keyed by category.
    pub per_category_confirmed: HashMap<Category, u64>,
    /// Mean start hour of past activities.
    pub average_start_hour: Option<f64>,
}

impl ParticipationHistory {
    /// Participations recorded in `hub_id`.
    #[must_use]
    pub fn hub_count(&self, hub_id: u64) -> u64 {
        self.per_hub_counts.get(&hub_id).copied().unwrap_or_default()
    }

    /// Whether the user has never taken part in an activity.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}
