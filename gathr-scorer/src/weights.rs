//! Tunable weights and thresholds for feed scoring.
#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::ScoreWeightsError;

/// Every weight and threshold used by [`FeedScoringEngine`](crate::FeedScoringEngine).
///
/// Deserialisation fills missing fields from [`ScoreWeights::default`], so a
/// weights file only needs to name the values it overrides.
///
/// # Examples
/// ```
/// use gathr_scorer::ScoreWeights;
///
/// let weights = ScoreWeights {
///     interest_match: 0.4,
///     ..ScoreWeights::default()
/// };
/// assert!(weights.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Score for a candidate whose category the user declared interest in.
    pub interest_match: f64,
    /// Interest score for new users with interests.
    pub interest_match_new_user: f64,
    /// Flat interest score when the user declared no interests.
    pub interest_unknown: f64,

    /// Weight of the friends-going signal.
    pub mutual_friends: f64,
    /// Friend count at which the signal saturates.
    pub mutual_saturation: f64,
    /// Added to the normalised friend signal for returning inactive users.
    pub mutual_inactive_boost: f64,

    /// Weight of the starts-soon signal.
    pub freshness: f64,
    /// Hours ahead within which freshness applies.
    pub freshness_window_hours: i64,
    /// Hours ahead reported as "Starting within the hour".
    pub starting_now_hours: i64,
    /// Hours ahead reported as "Starting soon".
    pub starting_soon_hours: i64,

    /// Weight of the capacity signal.
    pub availability: f64,
    /// Fill ratio from which an activity counts as nearly full.
    pub nearly_full_ratio: f64,
    /// Availability factor for nearly full activities.
    pub nearly_full_factor: f64,
    /// Fill ratio from which an activity counts as healthily filled.
    pub filling_ratio: f64,
    /// Availability factor for healthily filled activities.
    pub filling_factor: f64,
    /// Availability factor for activities nobody joined yet.
    pub empty_factor: f64,
    /// Availability factor for everything else.
    pub sparse_factor: f64,
    /// Spots remaining at or below which scarcity is reported.
    pub scarce_spots: u32,

    /// Weight of the host trust signal.
    pub creator_trust: f64,
    /// Trust score mapped to a normalised value of one.
    pub trust_scale: f64,
    /// Normalised trust from which a host counts as trusted.
    pub trusted_host_threshold: f64,

    /// Weight of the popularity signal.
    pub popularity: f64,
    /// Join count at which popularity saturates.
    pub popularity_saturation: f64,
    /// Join count above which "Popular plan" is reported.
    pub popular_joins: u32,

    /// Bonus for recently created activities.
    pub recency_bonus: f64,
    /// Age in hours below which an activity counts as new.
    pub recency_window_hours: i64,

    /// Distance in km counted as near.
    pub near_km: f64,
    /// Bonus for near activities.
    pub near_bonus: f64,
    /// Distance in km counted as quick to reach.
    pub quick_km: f64,
    /// Bonus for quick-to-reach activities.
    pub quick_bonus: f64,
    /// Distance in km beyond which a penalty applies.
    pub far_km: f64,
    /// Penalty subtracted for far activities.
    pub far_penalty: f64,

    /// Weight of the start-hour alignment signal.
    pub time_of_day: f64,
    /// Denominator of the Gaussian alignment curve.
    pub time_of_day_spread: f64,
    /// Alignment above which a schedule match is recorded.
    pub schedule_match_threshold: f64,

    /// Weight of past confirmed participations in the category.
    pub category_success: f64,
    /// Participation count at which category success saturates.
    pub success_saturation: f64,

    /// Bonus for new users without interests.
    pub cold_start_no_interests: f64,
    /// Bonus for users new to the hub.
    pub cold_start_new_hub: f64,
    /// Bonus for returning inactive users.
    pub cold_start_inactive: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            interest_match: 0.35,
            interest_match_new_user: 0.45,
            interest_unknown: 0.05,
            mutual_friends: 0.25,
            mutual_saturation: 3.0,
            mutual_inactive_boost: 0.2,
            freshness: 0.15,
            freshness_window_hours: 12,
            starting_now_hours: 1,
            starting_soon_hours: 6,
            availability: 0.15,
            nearly_full_ratio: 0.9,
            nearly_full_factor: 0.9,
            filling_ratio: 0.5,
            filling_factor: 1.0,
            empty_factor: 0.4,
            sparse_factor: 0.7,
            scarce_spots: 3,
            creator_trust: 0.05,
            trust_scale: 200.0,
            trusted_host_threshold: 0.6,
            popularity: 0.05,
            popularity_saturation: 15.0,
            popular_joins: 5,
            recency_bonus: 0.08,
            recency_window_hours: 2,
            near_km: 2.0,
            near_bonus: 0.12,
            quick_km: 5.0,
            quick_bonus: 0.08,
            far_km: 10.0,
            far_penalty: 0.04,
            time_of_day: 0.1,
            time_of_day_spread: 18.0,
            schedule_match_threshold: 0.7,
            category_success: 0.08,
            success_saturation: 5.0,
            cold_start_no_interests: 0.12,
            cold_start_new_hub: 0.05,
            cold_start_inactive: 0.05,
        }
    }
}

impl ScoreWeights {
    /// Validate the weights and return a copy.
    ///
    /// # Errors
    /// Returns [`ScoreWeightsError::NonFinite`] or
    /// [`ScoreWeightsError::Negative`] naming the first offending field,
    /// [`ScoreWeightsError::ZeroDivisor`] when a saturation or scale value is
    /// zero, and [`ScoreWeightsError::DistanceTiers`] when the distance tiers
    /// are not ascending.
    pub fn validate(self) -> Result<Self, ScoreWeightsError> {
        for (field, value) in self.named_values() {
            if !value.is_finite() {
                return Err(ScoreWeightsError::NonFinite { field });
            }
            if value < 0.0 {
                return Err(ScoreWeightsError::Negative { field });
            }
        }
        for (field, value) in self.divisors() {
            if value == 0.0 {
                return Err(ScoreWeightsError::ZeroDivisor { field });
            }
        }
        if !(self.near_km <= self.quick_km && self.quick_km <= self.far_km) {
            return Err(ScoreWeightsError::DistanceTiers);
        }
        if self.freshness_window_hours <= 0 {
            return Err(ScoreWeightsError::ZeroDivisor {
                field: "freshness_window_hours",
            });
        }
        Ok(self)
    }

    const fn divisors(&self) -> [(&'static str, f64); 5] {
        [
            ("mutual_saturation", self.mutual_saturation),
            ("trust_scale", self.trust_scale),
            ("popularity_saturation", self.popularity_saturation),
            ("time_of_day_spread", self.time_of_day_spread),
            ("success_saturation", self.success_saturation),
        ]
    }

    const fn named_values(&self) -> [(&'static str, f64); 34] {
        [
            ("interest_match", self.interest_match),
            ("interest_match_new_user", self.interest_match_new_user),
            ("interest_unknown", self.interest_unknown),
            ("mutual_friends", self.mutual_friends),
            ("mutual_saturation", self.mutual_saturation),
            ("mutual_inactive_boost", self.mutual_inactive_boost),
            ("freshness", self.freshness),
            ("availability", self.availability),
            ("nearly_full_ratio", self.nearly_full_ratio),
            ("nearly_full_factor", self.nearly_full_factor),
            ("filling_ratio", self.filling_ratio),
            ("filling_factor", self.filling_factor),
            ("empty_factor", self.empty_factor),
            ("sparse_factor", self.sparse_factor),
            ("creator_trust", self.creator_trust),
            ("trust_scale", self.trust_scale),
            ("trusted_host_threshold", self.trusted_host_threshold),
            ("popularity", self.popularity),
            ("popularity_saturation", self.popularity_saturation),
            ("recency_bonus", self.recency_bonus),
            ("near_km", self.near_km),
            ("near_bonus", self.near_bonus),
            ("quick_km", self.quick_km),
            ("quick_bonus", self.quick_bonus),
            ("far_km", self.far_km),
            ("far_penalty", self.far_penalty),
            ("time_of_day", self.time_of_day),
            ("time_of_day_spread", self.time_of_day_spread),
            ("schedule_match_threshold", self.schedule_match_threshold),
            ("category_success", self.category_success),
            ("success_saturation", self.success_saturation),
            ("cold_start_no_interests", self.cold_start_no_interests),
            ("cold_start_new_hub", self.cold_start_new_hub),
            ("cold_start_inactive", self.cold_start_inactive),
        ]
    }
}
