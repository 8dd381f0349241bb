//! Presentation hints derived from the top of a ranked feed.

use chrono::{NaiveDate, NaiveDateTime};
use gathr_core::ScoredActivity;
use serde::{Deserialize, Serialize};

const SOON_CTA: &str = "Happening in the next few hours";
const SOON_LABEL: &str = "Next few hours";
const LATER_CTA: &str = "Plan ahead for upcoming meetups";
const LATER_LABEL: &str = "This week";
const EXPAND_CTA: &str = "Expand your search";
const NOTHING_CTA: &str = "No activities available";
const PLENTY_MESSAGE: &str = "Plenty of spots available tonight";
const SCARCE_SPOTS: u32 = 2;

/// Call-to-action and scarcity hints for a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedMeta {
    /// Call-to-action text.
    pub cta_text: String,
    /// Scarcity hint, absent for an empty feed.
    pub scarcity_message: Option<String>,
    /// Label describing the time window of the feed.
    pub time_window_label: String,
    /// Identifiers of the leading activities.
    pub top_activity_ids: Vec<u64>,
}

/// Inputs for [`FeedMeta::summarise`] besides the activity list.
#[derive(Debug, Clone, Copy)]
pub struct MetaWindow {
    /// Date the feed was requested for.
    pub date: NaiveDate,
    /// Current local time.
    pub now: NaiveDateTime,
    /// Whether the fallback produced the feed.
    pub fallback_used: bool,
    /// Whole hours ahead that count as imminent.
    pub happening_soon_hours: i64,
    /// Number of leading activities to inspect.
    pub top_n: usize,
}

impl FeedMeta {
    /// Metadata for a feed with no activities.
    #[must_use]
    pub fn empty(date: NaiveDate, fallback_used: bool) -> Self {
        let cta = if fallback_used { EXPAND_CTA } else { NOTHING_CTA };
        Self {
            cta_text: cta.to_owned(),
            scarcity_message: None,
            time_window_label: date.to_string(),
            top_activity_ids: Vec::new(),
        }
    }

    /// Summarise the leading activities of `activities`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use gathr_ranker::{FeedMeta, MetaWindow};
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    /// let window = MetaWindow {
    ///     date,
    ///     now: date.and_hms_opt(9, 0, 0).unwrap(),
    ///     fallback_used: false,
    ///     happening_soon_hours: 3,
    ///     top_n: 5,
    /// };
    /// let meta = FeedMeta::summarise(&[], window);
    /// assert_eq!(meta.cta_text, "No activities available");
    /// assert_eq!(meta.time_window_label, "2024-01-01");
    /// ```
    #[must_use]
    pub fn summarise(activities: &[ScoredActivity], window: MetaWindow) -> Self {
        if activities.is_empty() {
            return Self::empty(window.date, window.fallback_used);
        }
        let top: Vec<&ScoredActivity> = activities.iter().take(window.top_n).collect();

        let happening_soon = top.iter().any(|scored| {
            scored.activity.start_time.is_some_and(|start| {
                let hours = (start - window.now).num_hours();
                (0..=window.happening_soon_hours).contains(&hours)
            })
        });
        let (cta, label) = if happening_soon {
            (SOON_CTA, SOON_LABEL)
        } else {
            (LATER_CTA, LATER_LABEL)
        };

        let scarcity = top
            .iter()
            .find_map(|scored| {
                scored
                    .activity
                    .spots_remaining()
                    .filter(|spots| (1..=SCARCE_SPOTS).contains(spots))
                    .map(|spots| format!("Only {spots} spots left in {}", scored.activity.title))
            })
            .unwrap_or_else(|| PLENTY_MESSAGE.to_owned());

        Self {
            cta_text: cta.to_owned(),
            scarcity_message: Some(scarcity),
            time_window_label: label.to_owned(),
            top_activity_ids: top.iter().map(|scored| scored.activity.id).collect(),
        }
    }
}
