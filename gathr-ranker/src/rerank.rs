//! Post-scoring passes that reorder a ranked list.
//!
//! The ranker runs them in a fixed order: sort, diversity, sort again,
//! exploration blend, truncate.

use std::cmp::Ordering;
use std::collections::HashMap;

use gathr_core::{Category, ScoredActivity, round_score};

/// Sort by score, highest first, keeping ties in their current order.
pub fn sort_by_score(scored: &mut [ScoredActivity]) {
    scored.sort_by(|lhs, rhs| {
        rhs.score
            .partial_cmp(&lhs.score)
            .unwrap_or(Ordering::Equal)
    });
}

/// Damp repeated categories, then re-sort.
///
/// Walking the list in order, the third and later activity of a category is
/// multiplied by `max(floor, 1 - (seen - 1) * step)`, where `seen` counts the
/// earlier activities of that category. Uncategorised activities are left
/// alone.
///
/// # Examples
///
/// ```
/// use gathr_core::{CandidateActivity, Category, ScoredActivity};
/// use gathr_ranker::apply_diversity;
///
/// let mut list: Vec<ScoredActivity> = (1..=3)
///     .map(|id| {
///         let activity = CandidateActivity::new(id, 1, "Match").with_category(Category::Sports);
///         ScoredActivity::new(activity, 0.5)
///     })
///     .collect();
/// apply_diversity(&mut list, 0.2, 0.5);
/// assert_eq!(list.last().map(|s| s.score), Some(0.4));
/// ```
pub fn apply_diversity(scored: &mut [ScoredActivity], step: f64, floor: f64) {
    let mut seen: HashMap<Category, u32> = HashMap::new();
    for item in scored.iter_mut() {
        let Some(category) = item.activity.category else {
            continue;
        };
        let count = seen.entry(category).or_default();
        if *count >= 2 {
            item.score = penalised(item.score, *count, step, floor);
            item.diversity_penalty_applied = true;
        }
        *count = count.saturating_add(1);
    }
    sort_by_score(scored);
}

#[expect(
    clippy::float_arithmetic,
    reason = "the penalty scales linearly with repeat count"
)]
fn penalised(score: f64, seen: u32, step: f64, floor: f64) -> f64 {
    let factor = (1.0 - f64::from(seen.saturating_sub(1)) * step).max(floor);
    round_score(score * factor)
}

/// Reserve room for other categories when the user has a single interest.
///
/// Up to `max(1, round(limit * share))` matching activities come first,
/// followed by up to `max(1, limit - quota)` others, then the remainder in
/// their original order. Lists are returned unchanged when the user has
/// zero or several interests, or when nothing falls outside the interest.
pub fn blend_exploration(
    scored: Vec<ScoredActivity>,
    interests: &[Category],
    limit: usize,
    share: f64,
) -> Vec<ScoredActivity> {
    let [dominant] = interests else {
        return scored;
    };
    let (matches, others): (Vec<usize>, Vec<usize>) = (0..scored.len()).partition(|&index| {
        scored
            .get(index)
            .is_some_and(|s| s.activity.category == Some(*dominant))
    });
    if others.is_empty() {
        return scored;
    }

    let interest_quota = interest_quota(limit, share);
    let exploration_quota = limit.saturating_sub(interest_quota).max(1);

    let mut order: Vec<usize> = Vec::with_capacity(scored.len());
    order.extend(matches.iter().take(interest_quota));
    order.extend(others.iter().take(exploration_quota));
    let remainder: Vec<usize> = (0..scored.len())
        .filter(|index| !order.contains(index))
        .collect();
    order.extend(remainder);

    let mut slots: Vec<Option<ScoredActivity>> = scored.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|index| slots.get_mut(index).and_then(Option::take))
        .collect()
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the quota is a rounded, clamped share of a small limit"
)]
fn interest_quota(limit: usize, share: f64) -> usize {
    let limit_f = u32::try_from(limit).map_or(f64::from(u32::MAX), f64::from);
    let quota = (limit_f * share.clamp(0.0, 1.0)).round();
    (quota as usize).max(1)
}
