//! Feed interaction events.
//!
//! Clients report what a user did with a feed entry. The orchestrator
//! validates the report, stamps it with the current time and forwards it to an
//! [`InteractionSink`](crate::InteractionSink).

use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest feed position accepted in an interaction report.
pub const MAX_POSITION: u32 = 100;

/// Longest accepted session identifier, in characters.
pub const MAX_SESSION_ID_LEN: usize = 100;

/// What the user did with a feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedAction {
    /// Entry was rendered on screen.
    Viewed,
    /// Entry was opened.
    Clicked,
    /// User joined from the feed.
    Joined,
    /// User hid the entry.
    Dismissed,
}

impl FeedAction {
    /// Lower-case wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Viewed => "viewed",
            Self::Clicked => "clicked",
            Self::Joined => "joined",
            Self::Dismissed => "dismissed",
        }
    }

    /// Analytics event name emitted for the action.
    #[must_use]
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::Viewed => "activity_viewed_from_feed",
            Self::Clicked => "activity_clicked_from_feed",
            Self::Joined => "activity_joined_from_feed",
            Self::Dismissed => "activity_dismissed_from_feed",
        }
    }
}

impl std::fmt::Display for FeedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedAction {
    type Err = InteractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "viewed" => Ok(Self::Viewed),
            "clicked" => Ok(Self::Clicked),
            "joined" => Ok(Self::Joined),
            "dismissed" => Ok(Self::Dismissed),
            _ => Err(InteractionError::UnknownAction(s.to_owned())),
        }
    }
}

/// Errors raised by [`FeedInteraction::validate`] and action parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InteractionError {
    /// The action name is not one of the supported actions.
    #[error("unknown feed action '{0}'")]
    UnknownAction(String),
    /// The reported position is beyond the feed bounds.
    #[error("position {position} exceeds maximum of {MAX_POSITION}")]
    PositionOutOfRange {
        /// Reported position.
        position: u32,
    },
    /// The session identifier is too long.
    #[error("session id of {len} characters exceeds maximum of {MAX_SESSION_ID_LEN}")]
    SessionIdTooLong {
        /// Length of the rejected identifier.
        len: usize,
    },
}

/// A client report of one interaction with a feed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedInteraction {
    /// Activity the user interacted with.
    pub activity_id: u64,
    /// Hub the feed was computed for.
    pub hub_id: u64,
    /// What happened.
    pub action: FeedAction,
    /// Zero-based position in the feed.
    #[serde(default)]
    pub position: Option<u32>,
    /// Score shown at the time.
    #[serde(default)]
    pub score: Option<f64>,
    /// Client session identifier.
    #[serde(default)]
    pub session_id: Option<String>,
}

impl FeedInteraction {
    /// Construct a report with only the required fields.
    #[must_use]
    pub const fn new(activity_id: u64, hub_id: u64, action: FeedAction) -> Self {
        Self {
            activity_id,
            hub_id,
            action,
            position: None,
            score: None,
            session_id: None,
        }
    }

    /// Check field bounds.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionError::PositionOutOfRange`] when the position is
    /// above [`MAX_POSITION`] and [`InteractionError::SessionIdTooLong`] when
    /// the session id exceeds [`MAX_SESSION_ID_LEN`] characters.
    pub fn validate(&self) -> Result<(), InteractionError> {
        if let Some(position) = self.position.filter(|p| *p > MAX_POSITION) {
            return Err(InteractionError::PositionOutOfRange { position });
        }
        if let Some(len) = self
            .session_id
            .as_deref()
            .map(|id| id.chars().count())
            .filter(|len| *len > MAX_SESSION_ID_LEN)
        {
            return Err(InteractionError::SessionIdTooLong { len });
        }
        Ok(())
    }
}

/// A validated interaction attributed to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedInteraction {
    /// Acting user.
    pub user_id: u64,
    /// The reported interaction.
    pub interaction: FeedInteraction,
    /// Server time the report was accepted.
    pub recorded_at: NaiveDateTime,
}
