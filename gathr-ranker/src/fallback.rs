//! Non-personalised feed used when ranking fails or finds nothing.

use gathr_core::{CandidateActivity, ScoredActivity};
use serde_json::Value;

const AVAILABLE_SCORE: f64 = 0.35;
const FULL_SCORE: f64 = 0.2;

/// Order candidates by availability and start time.
///
/// Invite-only activities are removed. Activities with open spots come
/// first, then earlier starts; activities without a start time sort last.
/// Each entry carries a flat score and a `fallback` marker in its metadata.
///
/// # Examples
///
/// ```
/// use gathr_core::CandidateActivity;
/// use gathr_ranker::fallback_feed;
///
/// let full = CandidateActivity::new(1, 7, "Full").with_capacity(2, 2, 0);
/// let open = CandidateActivity::new(2, 7, "Open");
/// let feed = fallback_feed(vec![full, open], 10);
/// assert_eq!(feed.first().map(|s| s.activity.id), Some(2));
/// assert_eq!(feed.first().map(|s| s.score), Some(0.35));
/// ```
#[must_use]
pub fn fallback_feed(candidates: Vec<CandidateActivity>, limit: usize) -> Vec<ScoredActivity> {
    let mut eligible: Vec<CandidateActivity> =
        candidates.into_iter().filter(|a| !a.invite_only).collect();
    eligible.sort_by_key(|a| (!a.has_availability(), a.start_time.is_none(), a.start_time));
    eligible.truncate(limit);
    eligible.into_iter().map(present).collect()
}

fn present(activity: CandidateActivity) -> ScoredActivity {
    let available = activity.has_availability();
    let (score, primary, secondary) = if available {
        (AVAILABLE_SCORE, "Happening soon", "Spots available right now")
    } else {
        (
            FULL_SCORE,
            "Currently full: join the waitlist",
            "We'll notify you if a spot opens",
        )
    };
    let mut scored = ScoredActivity::new(activity, score);
    scored.reasons.push(primary);
    scored.reasons.push(secondary);
    scored
        .metadata
        .insert("fallback".to_owned(), Value::Bool(true));
    scored
        .metadata
        .insert("available".to_owned(), Value::Bool(available));
    scored
}
