//! Unit tests for the feed ranker.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use gathr_core::{
    ActivityScorer, ActivityStore, CandidateActivity, Category, FeedAction, FeedInteraction,
    FixedClock, InteractionError, MemoryDirectory, MutualCountProvider, ParticipationHistory,
    PopularityMetrics, PopularityProvider, ScoredActivity, ScoringContext, SourceError,
    TrustScore, TrustScoreProvider, UserDirectory, UserProfile,
};
use rstest::{fixture, rstest};

use crate::{
    ALL_FULL_SUGGESTION, FeedConfig, FeedError, FeedRanker, InvalidationScope,
    NO_ACTIVITIES_SUGGESTION, SET_HOME_HUB_SUGGESTION, WIDEN_SEARCH_SUGGESTION,
};

const USER: u64 = 42;
const HOME_HUB: u64 = 7;

fn day(offset: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1 + offset).expect("valid date")
}

fn at(date: NaiveDate, hour: u32) -> NaiveDateTime {
    date.and_hms_opt(hour, 0, 0).expect("valid time")
}

fn clock() -> FixedClock {
    FixedClock(at(day(0), 9))
}

/// Collaborators wrapping a [`MemoryDirectory`] with failure switches and a
/// fetch counter.
#[derive(Debug, Default)]
struct TestSources {
    directory: MemoryDirectory,
    fetches: AtomicUsize,
    fail_signals: bool,
    fail_fetch: bool,
}

impl TestSources {
    fn new(directory: MemoryDirectory) -> Self {
        Self {
            directory,
            ..Self::default()
        }
    }

    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ActivityStore for TestSources {
    fn fetch_candidates(
        &self,
        hub_id: u64,
        date: NaiveDate,
        exclude_user: Option<u64>,
    ) -> Result<Vec<CandidateActivity>, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch {
            return Err(SourceError::unavailable("activity store", "offline"));
        }
        self.directory.fetch_candidates(hub_id, date, exclude_user)
    }
}

impl MutualCountProvider for TestSources {
    fn mutual_count(&self, user_id: u64, activity_id: u64) -> Result<i64, SourceError> {
        if self.fail_signals {
            return Err(SourceError::unavailable("social graph", "timeout"));
        }
        self.directory.mutual_count(user_id, activity_id)
    }
}

impl TrustScoreProvider for TestSources {
    fn trust_score(&self, user_id: u64) -> Result<TrustScore, SourceError> {
        self.directory.trust_score(user_id)
    }
}

impl PopularityProvider for TestSources {
    fn popularity(&self, activity_id: u64) -> Result<Option<PopularityMetrics>, SourceError> {
        self.directory.popularity(activity_id)
    }
}

impl UserDirectory for TestSources {
    fn user_profile(&self, user_id: u64) -> Result<Option<UserProfile>, SourceError> {
        self.directory.user_profile(user_id)
    }

    fn participation_history(&self, user_id: u64) -> Result<ParticipationHistory, SourceError> {
        self.directory.participation_history(user_id)
    }
}

/// Scores by descending activity id and remembers what it was asked.
#[derive(Debug, Default)]
struct RecordingScorer {
    seen: Mutex<Vec<u64>>,
}

impl RecordingScorer {
    fn seen(&self) -> Vec<u64> {
        self.seen.lock().map(|ids| ids.clone()).unwrap_or_default()
    }
}

impl ActivityScorer for RecordingScorer {
    #[expect(clippy::float_arithmetic, reason = "stub ranks lower ids higher")]
    fn score(&self, ctx: &ScoringContext<'_>) -> Option<ScoredActivity> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(ctx.activity.id);
        }
        let id = u32::try_from(ctx.activity.id).ok()?;
        let score = 1.0 / f64::from(id);
        Some(ScoredActivity::new(ctx.activity.clone(), score))
    }
}

fn meetup(id: u64, date: NaiveDate) -> CandidateActivity {
    CandidateActivity::new(id, HOME_HUB, format!("Meetup {id}")).with_start_time(at(date, 18))
}

#[fixture]
fn directory() -> MemoryDirectory {
    MemoryDirectory::default().with_user(UserProfile::new(USER).with_home_hub(HOME_HUB))
}

fn ranker(sources: TestSources) -> FeedRanker<TestSources, RecordingScorer> {
    FeedRanker::new(sources, RecordingScorer::default()).with_clock(clock())
}

#[rstest]
fn unknown_user_is_an_error(directory: MemoryDirectory) {
    let ranker = ranker(TestSources::new(directory));
    let err = ranker
        .get_feed(999, None, None, 10)
        .expect_err("unknown user");
    assert!(matches!(err, FeedError::UnknownUser { user_id: 999 }));
}

#[rstest]
fn ranks_home_hub_activities_for_today(directory: MemoryDirectory) {
    let sources = TestSources::new(
        directory
            .with_activity(meetup(3, day(0)))
            .with_activity(meetup(1, day(0)))
            .with_activity(meetup(2, day(1)))
            .with_activity(CandidateActivity::new(4, 99, "Elsewhere").with_start_time(at(day(0), 18))),
    );
    let feed = ranker(sources).get_feed(USER, None, None, 10).expect("feed");
    assert_eq!(feed.activity_ids(), vec![1, 3]);
    assert!(!feed.fallback_used);
    assert!(feed.suggestions.is_empty());
}

#[rstest]
fn explicit_hub_wins_over_home_hub(directory: MemoryDirectory) {
    let sources = TestSources::new(
        directory
            .with_activity(meetup(1, day(0)))
            .with_activity(CandidateActivity::new(2, 3, "Away").with_start_time(at(day(0), 18))),
    );
    let feed = ranker(sources)
        .get_feed(USER, Some(3), None, 10)
        .expect("feed");
    assert_eq!(feed.activity_ids(), vec![2]);
}

#[test]
fn unresolved_hub_returns_empty_fallback() {
    let sources = TestSources::new(MemoryDirectory::default().with_user(UserProfile::new(USER)));
    let config = FeedConfig {
        fallback_hub: None,
        ..FeedConfig::default()
    };
    let ranker = FeedRanker::with_config(sources, RecordingScorer::default(), config)
        .with_clock(clock());
    let feed = ranker.get_feed(USER, None, None, 10).expect("feed");
    assert!(feed.is_empty());
    assert!(feed.fallback_used);
    assert_eq!(feed.suggestions, vec![SET_HOME_HUB_SUGGESTION.to_owned()]);
    assert_eq!(feed.feed_meta.cta_text, "Expand your search");
}

#[rstest]
fn full_activities_never_reach_the_scorer(directory: MemoryDirectory) {
    let sources = TestSources::new(
        directory
            .with_activity(meetup(1, day(0)).with_capacity(4, 3, 1))
            .with_activity(meetup(2, day(0)).with_capacity(4, 1, 0)),
    );
    let scorer = Arc::new(RecordingScorer::default());
    let ranker = FeedRanker::new(sources, Arc::clone(&scorer)).with_clock(clock());
    let feed = ranker.get_feed(USER, None, None, 10).expect("feed");
    assert_eq!(feed.activity_ids(), vec![2]);
    assert_eq!(scorer.seen(), vec![2]);
}

#[rstest]
fn signal_failure_falls_back_for_the_same_day(directory: MemoryDirectory) {
    let mut sources = TestSources::new(
        directory
            .with_activity(meetup(1, day(0)))
            .with_activity(meetup(2, day(1))),
    );
    sources.fail_signals = true;
    let feed = ranker(sources).get_feed(USER, None, None, 10).expect("feed");
    assert!(feed.fallback_used);
    assert_eq!(feed.activity_ids(), vec![1]);
    assert!(feed.suggestions.is_empty());
    assert!(feed.activities.iter().all(|s| s.score > 0.3));
}

#[rstest]
fn empty_day_falls_back_to_the_next_day(directory: MemoryDirectory) {
    let sources = TestSources::new(directory.with_activity(meetup(5, day(1))));
    let feed = ranker(sources).get_feed(USER, None, None, 10).expect("feed");
    assert!(feed.fallback_used);
    assert_eq!(feed.activity_ids(), vec![5]);
    assert_eq!(
        feed.suggestions,
        vec![
            NO_ACTIVITIES_SUGGESTION.to_owned(),
            WIDEN_SEARCH_SUGGESTION.to_owned()
        ]
    );
    assert_eq!(feed.feed_meta.time_window_label, "This week");
}

#[rstest]
fn empty_requested_date_serves_next_day_fallback_scores(directory: MemoryDirectory) {
    let sources = TestSources::new(
        directory
            .with_activity(meetup(20, day(1)).with_capacity(10, 2, 0))
            .with_activity(meetup(21, day(1)).with_capacity(3, 2, 1))
            .with_activity(meetup(22, day(2))),
    );
    let feed = ranker(sources)
        .get_feed(USER, Some(HOME_HUB), Some(day(0)), 10)
        .expect("feed");

    assert!(feed.fallback_used);
    assert_eq!(feed.activity_ids(), vec![20, 21]);
    assert!(
        feed.activities
            .iter()
            .all(|s| s.activity.start_time.map(|start| start.date()) == Some(day(1)))
    );
    let scores: Vec<f64> = feed.activities.iter().map(|s| s.score).collect();
    assert_eq!(scores, vec![0.35, 0.2]);
}

#[rstest]
fn all_full_fallback_suggests_the_waitlist(directory: MemoryDirectory) {
    let sources = TestSources::new(
        directory
            .with_activity(meetup(1, day(0)).with_capacity(2, 2, 0))
            .with_activity(meetup(2, day(1)).with_capacity(2, 1, 1)),
    );
    let feed = ranker(sources).get_feed(USER, None, None, 10).expect("feed");
    assert_eq!(feed.activity_ids(), vec![2]);
    assert_eq!(feed.suggestions.last().map(String::as_str), Some(ALL_FULL_SUGGESTION));
    assert_eq!(feed.suggestions.len(), 3);
}

#[rstest]
fn failing_store_yields_empty_fallback(directory: MemoryDirectory) {
    let mut sources = TestSources::new(directory.with_activity(meetup(1, day(0))));
    sources.fail_fetch = true;
    let feed = ranker(sources).get_feed(USER, None, None, 10).expect("feed");
    assert!(feed.is_empty());
    assert!(feed.fallback_used);
    assert_eq!(feed.feed_meta.cta_text, "Expand your search");
    assert_eq!(feed.feed_meta.time_window_label, "2024-01-01");
}

#[rstest]
#[case(2, 2)]
#[case(0, 20)]
#[case(-5, 20)]
fn feed_respects_limit(directory: MemoryDirectory, #[case] limit: i32, #[case] expected: usize) {
    let with_activities = (1..=25).fold(directory, |dir, id| dir.with_activity(meetup(id, day(0))));
    let feed = ranker(TestSources::new(with_activities))
        .get_feed(USER, None, None, limit)
        .expect("feed");
    assert_eq!(feed.activities.len(), expected);
}

#[rstest]
fn cached_feeds_skip_the_store(directory: MemoryDirectory) {
    let ranker = ranker(TestSources::new(directory.with_activity(meetup(1, day(0)))));
    let first = ranker.get_feed(USER, None, None, 10).expect("feed");
    let second = ranker.get_feed(USER, None, Some(day(0)), 10).expect("feed");
    assert_eq!(first, second);
    assert_eq!(ranker.sources().fetch_count(), 1);
}

#[rstest]
fn large_limits_bypass_the_cache(directory: MemoryDirectory) {
    let ranker = ranker(TestSources::new(directory.with_activity(meetup(1, day(0)))));
    ranker.get_feed(USER, None, None, 51).expect("feed");
    ranker.get_feed(USER, None, None, 51).expect("feed");
    assert_eq!(ranker.sources().fetch_count(), 2);
}

#[rstest]
fn default_invalidation_drops_other_users_feeds(directory: MemoryDirectory) {
    let ranker = ranker(TestSources::new(
        directory
            .with_user(UserProfile::new(7).with_home_hub(HOME_HUB))
            .with_activity(meetup(1, day(0))),
    ));
    ranker.get_feed(USER, None, None, 10).expect("feed");
    ranker.get_feed(7, None, None, 10).expect("feed");
    assert_eq!(ranker.sources().fetch_count(), 2);

    ranker.invalidate_user_feed_cache(USER);
    ranker.get_feed(7, None, None, 10).expect("feed");
    assert_eq!(ranker.sources().fetch_count(), 3);
}

#[rstest]
#[case(InvalidationScope::User, 1)]
#[case(InvalidationScope::All, 2)]
fn invalidation_follows_scope(
    directory: MemoryDirectory,
    #[case] scope: InvalidationScope,
    #[case] other_fetches: usize,
) {
    let sources = TestSources::new(
        directory
            .with_user(UserProfile::new(7).with_home_hub(HOME_HUB))
            .with_activity(meetup(1, day(0))),
    );
    let mut config = FeedConfig::default();
    config.cache.scope = scope;
    let ranker =
        FeedRanker::with_config(sources, RecordingScorer::default(), config).with_clock(clock());

    ranker.get_feed(USER, None, None, 10).expect("feed");
    ranker.get_feed(7, None, None, 10).expect("feed");
    ranker.invalidate_user_feed_cache(USER);
    ranker.get_feed(USER, None, None, 10).expect("feed");
    let before_other = ranker.sources().fetch_count();
    ranker.get_feed(7, None, None, 10).expect("feed");

    assert_eq!(before_other, 3);
    assert_eq!(ranker.sources().fetch_count() - 2, other_fetches);
}

#[rstest]
fn flushing_recomputes_every_feed(directory: MemoryDirectory) {
    let ranker = ranker(TestSources::new(directory.with_activity(meetup(1, day(0)))));
    ranker.get_feed(USER, None, None, 10).expect("feed");
    ranker.invalidate_all();
    ranker.get_feed(USER, None, None, 10).expect("feed");
    assert_eq!(ranker.sources().fetch_count(), 2);
}

#[rstest]
fn interactions_are_stamped_and_stored(directory: MemoryDirectory) {
    let ranker = ranker(TestSources::new(MemoryDirectory::default()));
    let mut interaction = FeedInteraction::new(1, HOME_HUB, FeedAction::Joined);
    interaction.position = Some(3);
    let recorded = ranker
        .record_interaction(&directory, USER, interaction)
        .expect("recorded");
    assert_eq!(recorded.recorded_at, at(day(0), 9));
    assert_eq!(directory.recorded_interactions(), vec![recorded]);
}

#[rstest]
fn invalid_interactions_are_rejected(directory: MemoryDirectory) {
    let ranker = ranker(TestSources::new(MemoryDirectory::default()));
    let mut interaction = FeedInteraction::new(1, HOME_HUB, FeedAction::Viewed);
    interaction.position = Some(101);
    let err = ranker
        .record_interaction(&directory, USER, interaction)
        .expect_err("position out of range");
    assert!(matches!(
        err,
        FeedError::Interaction(InteractionError::PositionOutOfRange { position: 101 })
    ));
    assert!(directory.recorded_interactions().is_empty());
}

#[rstest]
fn single_interest_users_see_other_categories(directory: MemoryDirectory) {
    let fan = UserProfile::new(8)
        .with_home_hub(HOME_HUB)
        .with_interests(vec![Category::Sports]);
    let sources = TestSources::new(
        (1..=4)
            .fold(directory.with_user(fan), |dir, id| {
                dir.with_activity(meetup(id, day(0)).with_category(Category::Sports))
            })
            .with_activity(meetup(9, day(0)).with_category(Category::Art)),
    );
    let feed = ranker(sources).get_feed(8, None, None, 3).expect("feed");
    // two of three slots for Sports, one for exploration
    assert_eq!(feed.activity_ids(), vec![1, 2, 9]);
}
