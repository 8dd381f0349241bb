//! Candidate activities and their capacity and location helpers.

use chrono::NaiveDateTime;
use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::Category;

/// A denormalised activity ready to be ranked.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`. A capacity
/// of zero is treated the same as an absent capacity: the activity is
/// uncapped.
///
/// # Examples
/// ```
/// use gathr_core::{CandidateActivity, Category};
///
/// let activity = CandidateActivity::new(1, 7, "Sunset Run")
///     .with_category(Category::Sports)
///     .with_capacity(8, 3, 2);
///
/// assert_eq!(activity.spots_remaining(), Some(3));
/// assert!(activity.has_availability());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateActivity {
    /// Unique identifier.
    pub id: u64,
    /// Hub the activity belongs to.
    pub hub_id: u64,
    /// Display title.
    pub title: String,
    /// Category, when the host picked one.
    #[serde(default)]
    pub category: Option<Category>,
    /// Local start time.
    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,
    /// Local end time.
    #[serde(default)]
    pub end_time: Option<NaiveDateTime>,
    /// Meeting point.
    #[serde(default)]
    pub location: Option<Coord<f64>>,
    /// Position of the owning hub, used when no meeting point is set.
    #[serde(default)]
    pub hub_location: Option<Coord<f64>>,
    /// Identifier of the hosting user.
    #[serde(default)]
    pub created_by: Option<u64>,
    /// Maximum number of participants.
    #[serde(default)]
    pub max_members: Option<u32>,
    /// Confirmed participants.
    #[serde(default)]
    pub confirmed_count: u32,
    /// Participants who registered interest.
    #[serde(default)]
    pub interested_count: u32,
    /// Whether joining requires an invite.
    #[serde(default)]
    pub invite_only: bool,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl CandidateActivity {
    /// Construct an activity with only identity fields set.
    #[must_use]
    pub fn new(id: u64, hub_id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            hub_id,
            title: title.into(),
            category: None,
            start_time: None,
            end_time: None,
            location: None,
            hub_location: None,
            created_by: None,
            max_members: None,
            confirmed_count: 0,
            interested_count: 0,
            invite_only: false,
            created_at: None,
        }
    }

    /// Set the category while returning `self` for chaining.
    #[must_use]
    pub const fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Set the start time while returning `self` for chaining.
    #[must_use]
    pub const fn with_start_time(mut self, start_time: NaiveDateTime) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Set capacity and participant counts while returning `self`.
    #[must_use]
    pub const fn with_capacity(mut self, max_members: u32, confirmed: u32, interested: u32) -> Self {
        self.max_members = Some(max_members);
        self.confirmed_count = confirmed;
        self.interested_count = interested;
        self
    }

    /// Set the meeting point while returning `self` for chaining.
    #[must_use]
    pub const fn with_location(mut self, location: Coord<f64>) -> Self {
        self.location = Some(location);
        self
    }

    /// Capacity, or `None` when the activity is uncapped.
    #[must_use]
    pub fn capacity(&self) -> Option<u32> {
        self.max_members.filter(|max| *max > 0)
    }

    /// Confirmed plus interested participants.
    #[must_use]
    pub const fn participant_count(&self) -> u32 {
        self.confirmed_count.saturating_add(self.interested_count)
    }

    /// Spots left before the activity is full, floored at zero.
    ///
    /// Returns `None` for uncapped activities.
    #[must_use]
    pub fn spots_remaining(&self) -> Option<u32> {
        self.capacity()
            .map(|capacity| capacity.saturating_sub(self.participant_count()))
    }

    /// Whether at least one more participant can join.
    #[must_use]
    pub fn has_availability(&self) -> bool {
        self.spots_remaining().is_none_or(|spots| spots > 0)
    }

    /// Meeting point, falling back to the hub's position.
    #[must_use]
    pub fn resolved_location(&self) -> Option<Coord<f64>> {
        self.location.or(self.hub_location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(8), 3, 2, Some(3))]
    #[case(Some(4), 3, 2, Some(0))]
    #[case(Some(0), 3, 2, None)]
    #[case(None, 3, 2, None)]
    fn spots_remaining_floors_and_treats_zero_as_uncapped(
        #[case] max_members: Option<u32>,
        #[case] confirmed: u32,
        #[case] interested: u32,
        #[case] expected: Option<u32>,
    ) {
        let activity = CandidateActivity {
            max_members,
            confirmed_count: confirmed,
            interested_count: interested,
            ..CandidateActivity::new(1, 1, "Board games")
        };
        assert_eq!(activity.spots_remaining(), expected);
    }

    #[test]
    fn full_activity_has_no_availability() {
        let activity = CandidateActivity::new(1, 1, "Climbing").with_capacity(2, 2, 0);
        assert!(!activity.has_availability());
    }

    #[test]
    fn location_falls_back_to_hub() {
        let hub = Coord { x: 77.1, y: 28.5 };
        let activity = CandidateActivity {
            hub_location: Some(hub),
            ..CandidateActivity::new(1, 1, "Picnic")
        };
        assert_eq!(activity.resolved_location(), Some(hub));
    }
}
