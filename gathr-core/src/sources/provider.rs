//! Collaborator traits queried while building a feed.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    CandidateActivity, ParticipationHistory, PopularityMetrics, RecordedInteraction, TrustScore,
    UserProfile,
};

use super::error::SourceError;

/// Fetch candidate activities for a hub and day.
///
/// Implementations return activities starting on `date` in `hub_id`. When
/// `exclude_user` is set, activities that user already takes part in are
/// left out.
///
/// # Examples
///
/// ```rust
/// use chrono::NaiveDate;
/// use gathr_core::{ActivityStore, CandidateActivity, SourceError};
///
/// struct Empty;
///
/// impl ActivityStore for Empty {
///     fn fetch_candidates(
///         &self,
///         _hub_id: u64,
///         _date: NaiveDate,
///         _exclude_user: Option<u64>,
///     ) -> Result<Vec<CandidateActivity>, SourceError> {
///         Ok(Vec::new())
///     }
/// }
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// assert!(Empty.fetch_candidates(7, date, None)?.is_empty());
/// # Ok::<(), SourceError>(())
/// ```
pub trait ActivityStore: Send + Sync {
    /// Return candidates for `hub_id` on `date`.
    fn fetch_candidates(
        &self,
        hub_id: u64,
        date: NaiveDate,
        exclude_user: Option<u64>,
    ) -> Result<Vec<CandidateActivity>, SourceError>;
}

/// Count friends of a user taking part in an activity.
pub trait MutualCountProvider: Send + Sync {
    /// Return the number of the user's friends in `activity_id`.
    fn mutual_count(&self, user_id: u64, activity_id: u64) -> Result<i64, SourceError>;
}

/// Look up a user's trust score.
pub trait TrustScoreProvider: Send + Sync {
    /// Return the trust score of `user_id`.
    fn trust_score(&self, user_id: u64) -> Result<TrustScore, SourceError>;
}

/// Look up engagement counters for an activity.
pub trait PopularityProvider: Send + Sync {
    /// Return metrics for `activity_id`, or `None` when untracked.
    fn popularity(&self, activity_id: u64) -> Result<Option<PopularityMetrics>, SourceError>;
}

/// Look up user profiles and participation history.
pub trait UserDirectory: Send + Sync {
    /// Return the profile of `user_id`, or `None` when the user is unknown.
    fn user_profile(&self, user_id: u64) -> Result<Option<UserProfile>, SourceError>;

    /// Return aggregated participation facts for `user_id`.
    fn participation_history(&self, user_id: u64) -> Result<ParticipationHistory, SourceError>;
}

/// Persist validated feed interactions.
pub trait InteractionSink: Send + Sync {
    /// Store one interaction.
    fn record(&self, interaction: &RecordedInteraction) -> Result<(), SourceError>;
}

/// Every read-side collaborator the feed needs, bundled.
///
/// Implemented automatically for any type providing all of them.
pub trait FeedSources:
    ActivityStore + MutualCountProvider + TrustScoreProvider + PopularityProvider + UserDirectory
{
}

impl<T> FeedSources for T where
    T: ActivityStore + MutualCountProvider + TrustScoreProvider + PopularityProvider + UserDirectory
{
}

impl<T: ActivityStore + ?Sized> ActivityStore for Arc<T> {
    fn fetch_candidates(
        &self,
        hub_id: u64,
        date: NaiveDate,
        exclude_user: Option<u64>,
    ) -> Result<Vec<CandidateActivity>, SourceError> {
        (**self).fetch_candidates(hub_id, date, exclude_user)
    }
}

impl<T: MutualCountProvider + ?Sized> MutualCountProvider for Arc<T> {
    fn mutual_count(&self, user_id: u64, activity_id: u64) -> Result<i64, SourceError> {
        (**self).mutual_count(user_id, activity_id)
    }
}

impl<T: TrustScoreProvider + ?Sized> TrustScoreProvider for Arc<T> {
    fn trust_score(&self, user_id: u64) -> Result<TrustScore, SourceError> {
        (**self).trust_score(user_id)
    }
}

impl<T: PopularityProvider + ?Sized> PopularityProvider for Arc<T> {
    fn popularity(&self, activity_id: u64) -> Result<Option<PopularityMetrics>, SourceError> {
        (**self).popularity(activity_id)
    }
}

impl<T: UserDirectory + ?Sized> UserDirectory for Arc<T> {
    fn user_profile(&self, user_id: u64) -> Result<Option<UserProfile>, SourceError> {
        (**self).user_profile(user_id)
    }

    fn participation_history(&self, user_id: u64) -> Result<ParticipationHistory, SourceError> {
        (**self).participation_history(user_id)
    }
}

impl<T: InteractionSink + ?Sized> InteractionSink for Arc<T> {
    fn record(&self, interaction: &RecordedInteraction) -> Result<(), SourceError> {
        (**self).record(interaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Offline;

    impl TrustScoreProvider for Offline {
        fn trust_score(&self, _user_id: u64) -> Result<TrustScore, SourceError> {
            Err(SourceError::unavailable("trust scores", "connection refused"))
        }
    }

    #[rstest]
    fn arc_forwards_to_inner() {
        let shared = Arc::new(Offline);
        let err = shared.trust_score(3).expect_err("offline provider fails");
        assert_eq!(
            err.to_string(),
            "trust scores unavailable: connection refused"
        );
    }
}
