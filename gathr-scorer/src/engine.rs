//! Multi-factor scoring of feed candidates.
//!
//! [`FeedScoringEngine`] sums independent sub-scores (interest match, friends
//! going, start proximity, capacity, host trust, popularity, recency,
//! distance, start-hour alignment, category success and cold-start
//! adjustments). Each sub-score may append a reason and record the facts it
//! used in the metadata map so the ranking stays explainable.
#![forbid(unsafe_code)]

use chrono::{Duration, Timelike};
use gathr_core::{
    ActivityScorer, ColdStartType, Metadata, Reasons, ScoredActivity, ScoringContext, round_score,
};
use geo::{Distance, Haversine, Point};
use serde_json::Value;

use crate::{ScoreWeights, ScoreWeightsError};

const POPULAR_IN_HUB: &str = "Popular in this hub";
const WELCOME_BACK: &str = "Welcome back!";

/// Reasons, metadata and the friend count gathered while scoring.
#[derive(Debug, Default)]
struct ScoreSheet {
    reasons: Reasons,
    metadata: Metadata,
    mutual_count: Option<u32>,
}

impl ScoreSheet {
    fn note(&mut self, key: &str, value: impl Into<Value>) {
        self.metadata.insert(key.to_owned(), value.into());
    }
}

/// Default [`ActivityScorer`] for personalised feeds.
///
/// # Examples
/// ```
/// use std::collections::HashMap;
/// use chrono::NaiveDate;
/// use gathr_core::{
///     ActivityScorer, CandidateActivity, CandidateSignals, Category, ColdStartType,
///     ScoringContext,
/// };
/// use gathr_scorer::FeedScoringEngine;
///
/// let now = NaiveDate::from_ymd_opt(2024, 1, 1)
///     .and_then(|d| d.and_hms_opt(9, 0, 0))
///     .unwrap();
/// let activity = CandidateActivity::new(1, 7, "Morning run").with_category(Category::Sports);
/// let successes = HashMap::new();
/// let ctx = ScoringContext {
///     user_id: 42,
///     activity: &activity,
///     interests: &[Category::Sports],
///     now,
///     cold_start: ColdStartType::None,
///     location: None,
///     preferred_hour: None,
///     success_counts: &successes,
///     spots_remaining: None,
///     signals: CandidateSignals::default(),
/// };
///
/// let scored = FeedScoringEngine::default().score(&ctx).unwrap();
/// assert_eq!(scored.score, 0.35);
/// assert_eq!(scored.reasons.primary(), "Matches your Sports interest");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeedScoringEngine {
    weights: ScoreWeights,
}

impl FeedScoringEngine {
    /// Build an engine with the given weights, without validation.
    #[must_use]
    pub const fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    /// Build an engine after validating `weights`.
    ///
    /// # Errors
    /// Propagates [`ScoreWeightsError`] from [`ScoreWeights::validate`].
    pub fn try_new(weights: ScoreWeights) -> Result<Self, ScoreWeightsError> {
        weights.validate().map(Self::new)
    }

    /// Weights in use.
    #[must_use]
    pub const fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    fn interest(&self, ctx: &ScoringContext<'_>, sheet: &mut ScoreSheet) -> f64 {
        if ctx.interests.is_empty() {
            return self.weights.interest_unknown;
        }
        let Some(category) = ctx.activity.category else {
            return 0.0;
        };
        if !ctx.interests.contains(&category) {
            return 0.0;
        }
        sheet
            .reasons
            .push(format!("Matches your {} interest", category.label()));
        if ctx.cold_start == ColdStartType::NewUserWithInterests {
            self.weights.interest_match_new_user
        } else {
            self.weights.interest_match
        }
    }

    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "friend counts are small and normalised against a float saturation point"
    )]
    fn mutual_friends(&self, ctx: &ScoringContext<'_>, sheet: &mut ScoreSheet) -> f64 {
        let count = ctx.signals.mutual_count;
        if count <= 0 {
            return 0.0;
        }
        sheet.mutual_count = Some(u32::try_from(count).unwrap_or(u32::MAX));
        sheet.note("mutualCount", count);

        let mut normalised = (count as f64 / self.weights.mutual_saturation).min(1.0);
        if ctx.cold_start == ColdStartType::InactiveUserReturning {
            normalised += self.weights.mutual_inactive_boost;
        }
        if count == 1 {
            sheet.reasons.push("1 friend is going");
        } else {
            sheet.reasons.push(format!("{count} friends are going"));
        }
        self.weights.mutual_friends * normalised
    }

    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "freshness decays linearly over a window of a few hours"
    )]
    fn freshness(&self, ctx: &ScoringContext<'_>, sheet: &mut ScoreSheet) -> f64 {
        let Some(start) = ctx.activity.start_time else {
            return 0.0;
        };
        let window = self.weights.freshness_window_hours;
        let hours = (start - ctx.now).num_hours();
        if !(0..=window).contains(&hours) {
            return 0.0;
        }
        sheet.note("hoursUntilStart", hours);
        if hours <= self.weights.starting_now_hours {
            sheet.reasons.push("Starting within the hour");
        } else if hours <= self.weights.starting_soon_hours {
            sheet.reasons.push("Starting soon");
        }
        self.weights.freshness * (1.0 - hours as f64 / window as f64)
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "availability weighs the fill ratio of the activity"
    )]
    fn availability(&self, ctx: &ScoringContext<'_>, sheet: &mut ScoreSheet) -> f64 {
        let (Some(spots), Some(capacity)) = (ctx.spots_remaining, ctx.activity.capacity()) else {
            return 0.0;
        };
        if spots == 0 {
            return 0.0;
        }
        let w = &self.weights;
        let fill_ratio = f64::from(ctx.activity.participant_count()) / f64::from(capacity);
        let factor = if fill_ratio >= w.nearly_full_ratio {
            w.nearly_full_factor
        } else if fill_ratio >= w.filling_ratio {
            w.filling_factor
        } else if ctx.activity.participant_count() == 0 {
            w.empty_factor
        } else {
            w.sparse_factor
        };

        if spots <= w.scarce_spots {
            let noun = if spots == 1 { "spot" } else { "spots" };
            sheet.reasons.push(format!("Only {spots} {noun} left"));
        }
        sheet.note("spotsRemaining", spots);
        w.availability * factor
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "trust is normalised against a configurable scale"
    )]
    fn creator_trust(&self, ctx: &ScoringContext<'_>, sheet: &mut ScoreSheet) -> f64 {
        if ctx.activity.created_by.is_none() {
            return 0.0;
        }
        let Some(trust) = ctx.signals.creator_trust else {
            return 0.0;
        };
        let normalised = (f64::from(trust.score) / self.weights.trust_scale).clamp(0.0, 1.0);
        sheet.note("creatorTrustScore", trust.score);
        if normalised >= self.weights.trusted_host_threshold {
            sheet.note("trustedHost", true);
            sheet.reasons.push("Hosted by a trusted member");
        }
        self.weights.creator_trust * normalised
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "popularity saturates at a configurable join count"
    )]
    fn popularity(&self, ctx: &ScoringContext<'_>, sheet: &mut ScoreSheet) -> f64 {
        let Some(metrics) = ctx.signals.popularity else {
            return 0.0;
        };
        let joins = metrics.total_joins;
        sheet.note("totalJoins", joins);
        if joins > self.weights.popular_joins {
            sheet.reasons.push("Popular plan");
        }
        self.weights.popularity * (f64::from(joins) / self.weights.popularity_saturation).min(1.0)
    }

    fn recency(&self, ctx: &ScoringContext<'_>, sheet: &mut ScoreSheet) -> f64 {
        let window = Duration::hours(self.weights.recency_window_hours);
        let is_new = ctx
            .activity
            .created_at
            .is_some_and(|created| created > ctx.now - window);
        if !is_new {
            return 0.0;
        }
        sheet.note("newActivityBoost", true);
        sheet.reasons.push("New activity: be the first to join");
        self.weights.recency_bonus
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "great-circle distance is reported in kilometres to one decimal"
    )]
    fn distance(&self, ctx: &ScoringContext<'_>, sheet: &mut ScoreSheet) -> f64 {
        let (Some(user), Some(venue)) = (ctx.location, ctx.activity.resolved_location()) else {
            return 0.0;
        };
        let km = Haversine.distance(Point::from(user), Point::from(venue)) / 1000.0;
        sheet.note("distanceKm", (km * 10.0).round() / 10.0);

        let w = &self.weights;
        if km <= w.near_km {
            sheet.reasons.push("Near you");
            w.near_bonus
        } else if km <= w.quick_km {
            sheet.reasons.push("Quick to reach");
            w.quick_bonus
        } else if km > w.far_km {
            -w.far_penalty
        } else {
            0.0
        }
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "alignment follows a Gaussian curve around the preferred hour"
    )]
    fn time_of_day(&self, ctx: &ScoringContext<'_>, sheet: &mut ScoreSheet) -> f64 {
        let (Some(preferred), Some(start)) = (ctx.preferred_hour, ctx.activity.start_time) else {
            return 0.0;
        };
        let offset = f64::from(i32::from(preferred) - i32::try_from(start.hour()).unwrap_or(0));
        let alignment = (-(offset * offset) / self.weights.time_of_day_spread).exp();
        sheet.note("timeAlignment", alignment);
        if alignment > self.weights.schedule_match_threshold {
            sheet.note("scheduleMatch", true);
        }
        self.weights.time_of_day * alignment
    }

    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "category affinity saturates at a configurable count"
    )]
    fn category_success(&self, ctx: &ScoringContext<'_>, sheet: &mut ScoreSheet) -> f64 {
        let count = ctx.success_count();
        if count == 0 {
            return 0.0;
        }
        sheet.note("successCount", count);
        sheet.reasons.push("You've enjoyed similar plans");
        self.weights.category_success * (count as f64 / self.weights.success_saturation).min(1.0)
    }

    fn cold_start(&self, ctx: &ScoringContext<'_>, sheet: &mut ScoreSheet) -> f64 {
        match ctx.cold_start {
            ColdStartType::NewUserNoInterests => {
                sheet.reasons.push_unique(POPULAR_IN_HUB);
                self.weights.cold_start_no_interests
            }
            ColdStartType::ReturningUserNewHub => self.weights.cold_start_new_hub,
            ColdStartType::InactiveUserReturning => {
                sheet.reasons.push_unique(WELCOME_BACK);
                self.weights.cold_start_inactive
            }
            ColdStartType::None | ColdStartType::NewUserWithInterests => 0.0,
        }
    }
}

impl ActivityScorer for FeedScoringEngine {
    #[expect(
        clippy::float_arithmetic,
        reason = "the total is the sum of independent sub-scores"
    )]
    fn score(&self, ctx: &ScoringContext<'_>) -> Option<ScoredActivity> {
        if ctx.spots_remaining == Some(0) {
            return None;
        }

        let mut sheet = ScoreSheet::default();
        sheet.note("coldStartType", ctx.cold_start.as_str());

        let total = self.interest(ctx, &mut sheet)
            + self.mutual_friends(ctx, &mut sheet)
            + self.freshness(ctx, &mut sheet)
            + self.availability(ctx, &mut sheet)
            + self.creator_trust(ctx, &mut sheet)
            + self.popularity(ctx, &mut sheet)
            + self.recency(ctx, &mut sheet)
            + self.distance(ctx, &mut sheet)
            + self.time_of_day(ctx, &mut sheet)
            + self.category_success(ctx, &mut sheet)
            + self.cold_start(ctx, &mut sheet);

        if total <= 0.0 {
            log::debug!(
                "activity {} dropped with non-positive score {total}",
                ctx.activity.id
            );
            return None;
        }

        Some(ScoredActivity {
            activity: ctx.activity.clone(),
            score: round_score(total),
            reasons: sheet.reasons,
            mutual_count: sheet.mutual_count,
            spots_remaining: ctx.spots_remaining,
            metadata: sheet.metadata,
            diversity_penalty_applied: false,
        })
    }
}
