//! In-memory implementation of every feed collaborator.
//!
//! [`MemoryDirectory`] deserialises from a JSON snapshot and answers every
//! query with a linear scan. It backs the command-line tool and the
//! behaviour tests, and is intended only for small datasets.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::{
    ActivityStore, CandidateActivity, Category, InteractionSink, MutualCountProvider,
    ParticipationHistory, PopularityMetrics, PopularityProvider, RecordedInteraction, SourceError,
    TrustScore, TrustScoreProvider, UserDirectory, UserProfile,
};

/// Trust score reported for users without a stored score.
pub const BASELINE_TRUST_SCORE: i32 = 100;

/// One user's participation in one activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationRecord {
    /// Participating user.
    pub user_id: u64,
    /// Activity taken part in.
    pub activity_id: u64,
    /// Hub of the activity.
    pub hub_id: u64,
    /// Category of the activity.
    #[serde(default)]
    pub category: Option<Category>,
    /// Start of the activity.
    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,
    /// Whether attendance was confirmed rather than merely interested.
    #[serde(default)]
    pub confirmed: bool,
    /// When the user joined.
    pub participated_at: NaiveDateTime,
}

/// Friends of `user_id` taking part in `activity_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutualCountRecord {
    /// Viewing user.
    pub user_id: u64,
    /// Activity in question.
    pub activity_id: u64,
    /// Friends going.
    pub count: i64,
}

/// Snapshot of users, activities and signals held in memory.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use gathr_core::{ActivityStore, CandidateActivity, MemoryDirectory};
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 2)
///     .and_then(|d| d.and_hms_opt(18, 0, 0))
///     .unwrap();
/// let directory = MemoryDirectory::default()
///     .with_activity(CandidateActivity::new(1, 7, "Run").with_start_time(start));
///
/// let found = directory.fetch_candidates(7, start.date(), None)?;
/// assert_eq!(found.len(), 1);
/// # Ok::<(), gathr_core::SourceError>(())
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MemoryDirectory {
    /// Known user profiles.
    #[serde(default)]
    pub users: Vec<UserProfile>,
    /// Activities across every hub.
    #[serde(default)]
    pub activities: Vec<CandidateActivity>,
    /// Participation records.
    #[serde(default)]
    pub participations: Vec<ParticipationRecord>,
    /// Friend counts per user and activity.
    #[serde(default)]
    pub mutual_counts: Vec<MutualCountRecord>,
    /// Trust scores keyed by user identifier.
    #[serde(default)]
    pub trust_scores: BTreeMap<u64, i32>,
    /// Total joins keyed by activity identifier.
    #[serde(default)]
    pub popularity: BTreeMap<u64, u32>,
    #[serde(skip)]
    interactions: Mutex<Vec<RecordedInteraction>>,
}

impl MemoryDirectory {
    /// Parse a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the snapshot is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Add a user profile.
    #[must_use]
    pub fn with_user(mut self, profile: UserProfile) -> Self {
        self.users.push(profile);
        self
    }

    /// Add an activity.
    #[must_use]
    pub fn with_activity(mut self, activity: CandidateActivity) -> Self {
        self.activities.push(activity);
        self
    }

    /// Add a participation record.
    #[must_use]
    pub fn with_participation(mut self, record: ParticipationRecord) -> Self {
        self.participations.push(record);
        self
    }

    /// Set the friend count for a user and activity.
    #[must_use]
    pub fn with_mutual_count(mut self, user_id: u64, activity_id: u64, count: i64) -> Self {
        self.mutual_counts.push(MutualCountRecord {
            user_id,
            activity_id,
            count,
        });
        self
    }

    /// Set a user's trust score.
    #[must_use]
    pub fn with_trust_score(mut self, user_id: u64, score: i32) -> Self {
        self.trust_scores.insert(user_id, score);
        self
    }

    /// Set an activity's total joins.
    #[must_use]
    pub fn with_popularity(mut self, activity_id: u64, total_joins: u32) -> Self {
        self.popularity.insert(activity_id, total_joins);
        self
    }

    /// Interactions recorded so far, oldest first.
    #[must_use]
    pub fn recorded_interactions(&self) -> Vec<RecordedInteraction> {
        self.interactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn takes_part(&self, user_id: u64, activity_id: u64) -> bool {
        self.participations
            .iter()
            .any(|p| p.user_id == user_id && p.activity_id == activity_id)
    }
}

impl ActivityStore for MemoryDirectory {
    fn fetch_candidates(
        &self,
        hub_id: u64,
        date: NaiveDate,
        exclude_user: Option<u64>,
    ) -> Result<Vec<CandidateActivity>, SourceError> {
        Ok(self
            .activities
            .iter()
            .filter(|a| a.hub_id == hub_id)
            .filter(|a| a.start_time.is_some_and(|start| start.date() == date))
            .filter(|a| exclude_user.is_none_or(|user| !self.takes_part(user, a.id)))
            .cloned()
            .collect())
    }
}

impl MutualCountProvider for MemoryDirectory {
    fn mutual_count(&self, user_id: u64, activity_id: u64) -> Result<i64, SourceError> {
        Ok(self
            .mutual_counts
            .iter()
            .find(|m| m.user_id == user_id && m.activity_id == activity_id)
            .map_or(0, |m| m.count))
    }
}

impl TrustScoreProvider for MemoryDirectory {
    fn trust_score(&self, user_id: u64) -> Result<TrustScore, SourceError> {
        let score = self
            .trust_scores
            .get(&user_id)
            .copied()
            .unwrap_or(BASELINE_TRUST_SCORE);
        Ok(TrustScore { score })
    }
}

impl PopularityProvider for MemoryDirectory {
    fn popularity(&self, activity_id: u64) -> Result<Option<PopularityMetrics>, SourceError> {
        Ok(self
            .popularity
            .get(&activity_id)
            .map(|&total_joins| PopularityMetrics { total_joins }))
    }
}

impl UserDirectory for MemoryDirectory {
    fn user_profile(&self, user_id: u64) -> Result<Option<UserProfile>, SourceError> {
        Ok(self.users.iter().find(|u| u.id == user_id).cloned())
    }

    fn participation_history(&self, user_id: u64) -> Result<ParticipationHistory, SourceError> {
        let records: Vec<&ParticipationRecord> = self
            .participations
            .iter()
            .filter(|p| p.user_id == user_id)
            .collect();

        let mut per_hub_counts: HashMap<u64, u64> = HashMap::new();
        let mut per_category_confirmed: HashMap<Category, u64> = HashMap::new();
        for record in &records {
            *per_hub_counts.entry(record.hub_id).or_default() += 1;
            if let Some(category) = record.category.filter(|_| record.confirmed) {
                *per_category_confirmed.entry(category).or_default() += 1;
            }
        }

        Ok(ParticipationHistory {
            total_count: records.len() as u64,
            last_participation_at: records.iter().map(|r| r.participated_at).max(),
            per_hub_counts,
            per_category_confirmed,
            average_start_hour: average_start_hour(&records),
        })
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "averaging hours needs floating-point division over small counts"
)]
fn average_start_hour(records: &[&ParticipationRecord]) -> Option<f64> {
    let hours: Vec<u32> = records
        .iter()
        .filter_map(|r| r.start_time.map(|start| start.hour()))
        .collect();
    if hours.is_empty() {
        return None;
    }
    let total: u32 = hours.iter().sum();
    Some(f64::from(total) / hours.len() as f64)
}

impl InteractionSink for MemoryDirectory {
    fn record(&self, interaction: &RecordedInteraction) -> Result<(), SourceError> {
        self.interactions
            .lock()
            .map_err(|_| SourceError::unavailable("interaction log", "lock poisoned"))?
            .push(interaction.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid timestamp")
    }

    #[fixture]
    fn directory() -> MemoryDirectory {
        MemoryDirectory::default()
            .with_activity(CandidateActivity::new(1, 7, "Run").with_start_time(at(2, 18)))
            .with_activity(CandidateActivity::new(2, 7, "Chess").with_start_time(at(2, 20)))
            .with_activity(CandidateActivity::new(3, 8, "Swim").with_start_time(at(2, 9)))
            .with_activity(CandidateActivity::new(4, 7, "Brunch").with_start_time(at(3, 11)))
            .with_participation(ParticipationRecord {
                user_id: 42,
                activity_id: 2,
                hub_id: 7,
                category: Some(Category::Games),
                start_time: Some(at(2, 20)),
                confirmed: true,
                participated_at: at(1, 10),
            })
            .with_participation(ParticipationRecord {
                user_id: 42,
                activity_id: 9,
                hub_id: 8,
                category: Some(Category::Food),
                start_time: Some(at(1, 17)),
                confirmed: false,
                participated_at: at(1, 9),
            })
    }

    #[rstest]
    fn fetch_filters_hub_date_and_participation(directory: MemoryDirectory) {
        let ids = |user| -> Vec<u64> {
            directory
                .fetch_candidates(7, at(2, 0).date(), user)
                .expect("memory fetch")
                .iter()
                .map(|a| a.id)
                .collect()
        };
        assert_eq!(ids(None), vec![1, 2]);
        assert_eq!(ids(Some(42)), vec![1]);
    }

    #[rstest]
    fn history_aggregates_records(directory: MemoryDirectory) {
        let history = directory.participation_history(42).expect("history");
        assert_eq!(history.total_count, 2);
        assert_eq!(history.last_participation_at, Some(at(1, 10)));
        assert_eq!(history.hub_count(7), 1);
        assert_eq!(history.per_category_confirmed.get(&Category::Games), Some(&1));
        assert!(!history.per_category_confirmed.contains_key(&Category::Food));
        assert_eq!(history.average_start_hour, Some(18.5));
    }

    #[rstest]
    fn unknown_signals_use_defaults(directory: MemoryDirectory) {
        assert_eq!(directory.mutual_count(1, 1).expect("mutual"), 0);
        assert_eq!(
            directory.trust_score(5).expect("trust").score,
            BASELINE_TRUST_SCORE
        );
        assert_eq!(directory.popularity(1).expect("popularity"), None);
    }

    #[test]
    fn parses_snapshot_json() {
        let json = r#"{
            "users": [{"id": 1, "home_hub_id": 7, "interests": ["SPORTS"]}],
            "activities": [{"id": 3, "hub_id": 7, "title": "Run",
                            "location": {"x": 77.2, "y": 28.6}}],
            "trust_scores": {"1": 150},
            "popularity": {"3": 9}
        }"#;
        let directory = MemoryDirectory::from_json(json).expect("valid snapshot");
        let profile = directory.user_profile(1).expect("lookup").expect("known user");
        assert_eq!(profile.interests, vec![Category::Sports]);
        assert_eq!(directory.trust_score(1).expect("trust").score, 150);
        assert_eq!(
            directory.popularity(3).expect("popularity"),
            Some(PopularityMetrics { total_joins: 9 })
        );
    }
}
