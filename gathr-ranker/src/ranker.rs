//! `FeedRanker` orchestrates scoring, re-ranking, fallback and caching.

use chrono::{Days, Duration, NaiveDate};
use gathr_core::{
    ActivityScorer, CandidateActivity, CandidateSignals, Clock, ColdStartClassifier,
    FeedInteraction, FeedSources, InteractionSink, RecordedInteraction, ScoredActivity,
    ScoringContext, SourceError, SystemClock, UserProfile,
};
use log::{debug, error, info, warn};

use crate::cache::{FeedCache, FeedCacheKey};
use crate::config::{FeedConfig, InvalidationScope};
use crate::error::FeedError;
use crate::fallback::fallback_feed;
use crate::meta::{FeedMeta, MetaWindow};
use crate::rerank::{apply_diversity, blend_exploration, sort_by_score};
use crate::result::{
    ALL_FULL_SUGGESTION, FeedComputationResult, NO_ACTIVITIES_SUGGESTION,
    SET_HOME_HUB_SUGGESTION, WIDEN_SEARCH_SUGGESTION,
};

/// Personalised feed builder.
///
/// The ranker is generic over its collaborators: a bundle of read-side
/// sources and an activity scorer. It holds a shared cache and is safe to
/// use from several threads at once.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use gathr_core::{
///     ActivityScorer, CandidateActivity, FixedClock, MemoryDirectory, ScoredActivity,
///     ScoringContext, UserProfile,
/// };
/// use gathr_ranker::FeedRanker;
///
/// struct Flat;
///
/// impl ActivityScorer for Flat {
///     fn score(&self, ctx: &ScoringContext<'_>) -> Option<ScoredActivity> {
///         Some(ScoredActivity::new(ctx.activity.clone(), 0.5))
///     }
/// }
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let start = date.and_hms_opt(18, 0, 0).unwrap();
/// let sources = MemoryDirectory::default()
///     .with_user(UserProfile::new(1).with_home_hub(7))
///     .with_activity(CandidateActivity::new(10, 7, "Quiz night").with_start_time(start));
/// let ranker = FeedRanker::new(sources, Flat)
///     .with_clock(FixedClock(date.and_hms_opt(9, 0, 0).unwrap()));
///
/// let feed = ranker.get_feed(1, None, None, 10)?;
/// assert_eq!(feed.activity_ids(), vec![10]);
/// assert!(!feed.fallback_used);
/// # Ok::<(), gathr_ranker::FeedError>(())
/// ```
pub struct FeedRanker<S, C>
where
    S: FeedSources,
    C: ActivityScorer,
{
    sources: S,
    scorer: C,
    config: FeedConfig,
    classifier: ColdStartClassifier,
    cache: FeedCache,
    clock: Box<dyn Clock>,
}

impl<S, C> FeedRanker<S, C>
where
    S: FeedSources,
    C: ActivityScorer,
{
    /// Construct a ranker using default configuration.
    pub fn new(sources: S, scorer: C) -> Self {
        Self::with_config(sources, scorer, FeedConfig::default())
    }

    /// Construct a ranker with explicit configuration.
    pub fn with_config(sources: S, scorer: C, config: FeedConfig) -> Self {
        let classifier = Duration::try_days(config.inactivity_days)
            .map_or_else(ColdStartClassifier::default, ColdStartClassifier::new);
        let cache = FeedCache::new(&config.cache);
        Self {
            sources,
            scorer,
            config,
            classifier,
            cache,
            clock: Box::new(SystemClock),
        }
    }

    /// Replace the wall clock, typically with a fixed one in tests.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Collaborators the ranker reads from.
    #[must_use]
    pub const fn sources(&self) -> &S {
        &self.sources
    }

    /// Build the feed for `user_id`.
    ///
    /// `hub_id` defaults to the user's home hub, then to the configured
    /// fallback hub; `date` defaults to today. A `limit` of zero or less
    /// selects the configured default. Results for limits up to the cache
    /// ceiling are served from and stored in the cache.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::UnknownUser`] when the user has no profile and
    /// [`FeedError::Source`] when the profile lookup itself fails. Every
    /// other collaborator failure is absorbed by the fallback feed.
    pub fn get_feed(
        &self,
        user_id: u64,
        hub_id: Option<u64>,
        date: Option<NaiveDate>,
        limit: i32,
    ) -> Result<FeedComputationResult, FeedError> {
        let target_date = date.unwrap_or_else(|| self.clock.today());
        let key = FeedCacheKey {
            user_id,
            hub_id,
            date: target_date,
            limit,
        };
        let cacheable = self.config.is_cacheable(limit);
        if cacheable && let Some(hit) = self.cache.get(&key) {
            debug!("feed cache hit for user {user_id} on {target_date}");
            return Ok(hit);
        }

        let result = self.compute_feed(user_id, hub_id, target_date, limit)?;
        if cacheable {
            self.cache.insert(key, result.clone());
        }
        Ok(result)
    }

    /// Drop cached feeds after a change affecting `user_id`.
    ///
    /// Flushes every cached feed under the default
    /// [`InvalidationScope::All`]. With [`InvalidationScope::User`] only the
    /// user's own entries are evicted.
    pub fn invalidate_user_feed_cache(&self, user_id: u64) {
        info!("invalidating feed cache for user {user_id}");
        match self.config.cache.scope {
            InvalidationScope::User => self.cache.invalidate_user(user_id),
            InvalidationScope::All => self.cache.invalidate_all(),
        }
    }

    /// Drop every cached feed.
    pub fn invalidate_all(&self) {
        info!("flushing feed cache");
        self.cache.invalidate_all();
    }

    /// Validate, timestamp and store a feed interaction.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Interaction`] for an invalid interaction and
    /// [`FeedError::Source`] when the sink rejects it.
    pub fn record_interaction<K>(
        &self,
        sink: &K,
        user_id: u64,
        interaction: FeedInteraction,
    ) -> Result<RecordedInteraction, FeedError>
    where
        K: InteractionSink + ?Sized,
    {
        interaction.validate()?;
        let recorded = RecordedInteraction {
            user_id,
            interaction,
            recorded_at: self.clock.now(),
        };
        sink.record(&recorded)?;
        info!(
            "{} by user {user_id} for activity {}",
            recorded.interaction.action.event_name(),
            recorded.interaction.activity_id
        );
        Ok(recorded)
    }

    fn compute_feed(
        &self,
        user_id: u64,
        hub_id: Option<u64>,
        target_date: NaiveDate,
        limit: i32,
    ) -> Result<FeedComputationResult, FeedError> {
        let profile = self
            .sources
            .user_profile(user_id)?
            .ok_or(FeedError::UnknownUser { user_id })?;

        let Some(hub) = hub_id
            .or(profile.home_hub_id)
            .or(self.config.fallback_hub)
        else {
            warn!("no hub resolved for user {user_id}; returning an empty feed");
            return Ok(FeedComputationResult {
                activities: Vec::new(),
                fallback_used: true,
                suggestions: vec![SET_HOME_HUB_SUGGESTION.to_owned()],
                feed_meta: FeedMeta::empty(target_date, true),
            });
        };

        let effective_limit = self.config.effective_limit(limit);
        let mut suggestions = Vec::new();
        let (mut activities, mut fallback_used) =
            match self.personalised(&profile, hub, target_date, effective_limit) {
                Ok(ranked) => (ranked, false),
                Err(err) => {
                    error!("primary recommendation computation failed for user {user_id}: {err}");
                    (self.fallback(hub, target_date, effective_limit), true)
                }
            };

        if activities.is_empty() {
            fallback_used = true;
            suggestions.push(NO_ACTIVITIES_SUGGESTION.to_owned());
            suggestions.push(WIDEN_SEARCH_SUGGESTION.to_owned());
            let next_day = target_date
                .checked_add_days(Days::new(1))
                .unwrap_or(target_date);
            activities = self.fallback(hub, next_day, effective_limit);
        }

        if !activities.is_empty() && activities.iter().all(|s| !s.activity.has_availability()) {
            suggestions.push(ALL_FULL_SUGGESTION.to_owned());
        }

        let feed_meta = FeedMeta::summarise(
            &activities,
            MetaWindow {
                date: target_date,
                now: self.clock.now(),
                fallback_used,
                happening_soon_hours: self.config.happening_soon_hours,
                top_n: self.config.top_n,
            },
        );
        Ok(FeedComputationResult {
            activities,
            fallback_used,
            suggestions,
            feed_meta,
        })
    }

    fn personalised(
        &self,
        profile: &UserProfile,
        hub: u64,
        date: NaiveDate,
        limit: usize,
    ) -> Result<Vec<ScoredActivity>, SourceError> {
        let now = self.clock.now();
        let history = self.sources.participation_history(profile.id)?;
        let preferred_hour =
            profile.preferred_hour(Some(&history), self.config.default_preferred_hour);
        let cold_start =
            self.classifier
                .classify(Some(&history), Some(hub), profile.has_interests(), now);
        let location = profile.resolved_location();

        let candidates = self.sources.fetch_candidates(hub, date, Some(profile.id))?;
        if candidates.is_empty() {
            info!("no candidate activities in hub {hub} on {date} for user {}", profile.id);
            return Ok(Vec::new());
        }

        let mut scored = Vec::with_capacity(candidates.len());
        for activity in &candidates {
            let spots_remaining = activity.spots_remaining();
            if spots_remaining == Some(0) {
                continue;
            }
            let ctx = ScoringContext {
                user_id: profile.id,
                activity,
                interests: &profile.interests,
                now,
                cold_start,
                location,
                preferred_hour: Some(preferred_hour),
                success_counts: &history.per_category_confirmed,
                spots_remaining,
                signals: self.signals(profile.id, activity)?,
            };
            if let Some(result) = self.scorer.score(&ctx) {
                scored.push(result);
            }
        }

        sort_by_score(&mut scored);
        if scored.len() > self.config.diversity_threshold {
            apply_diversity(
                &mut scored,
                self.config.diversity_step,
                self.config.diversity_floor,
            );
        }
        let mut ranked = blend_exploration(
            scored,
            &profile.interests,
            limit,
            self.config.exploration_share,
        );
        ranked.truncate(limit);
        Ok(ranked)
    }

    fn signals(
        &self,
        user_id: u64,
        activity: &CandidateActivity,
    ) -> Result<CandidateSignals, SourceError> {
        let creator_trust = activity
            .created_by
            .map(|creator| self.sources.trust_score(creator))
            .transpose()?;
        Ok(CandidateSignals {
            mutual_count: self.sources.mutual_count(user_id, activity.id)?,
            creator_trust,
            popularity: self.sources.popularity(activity.id)?,
        })
    }

    fn fallback(&self, hub: u64, date: NaiveDate, limit: usize) -> Vec<ScoredActivity> {
        match self.sources.fetch_candidates(hub, date, None) {
            Ok(candidates) => fallback_feed(candidates, limit),
            Err(err) => {
                error!("fallback query failed for hub {hub} on {date}: {err}");
                Vec::new()
            }
        }
    }
}

impl<S, C> std::fmt::Debug for FeedRanker<S, C>
where
    S: FeedSources,
    C: ActivityScorer,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedRanker")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
