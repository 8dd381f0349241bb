//! Activity categories.
//!
//! The enum offers compile-time safety for interest matching and for the
//! per-category bookkeeping done while re-ranking a feed.
//!
//! # Examples
//! ```
//! use gathr_core::Category;
//!
//! assert_eq!(Category::Sports.as_str(), "SPORTS");
//! assert_eq!(Category::Sports.label(), "Sports");
//! assert_eq!("music".parse::<Category>(), Ok(Category::Music));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad category an activity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Sports and fitness.
    Sports,
    /// Food and drinks.
    Food,
    /// Art and creative sessions.
    Art,
    /// Music and nightlife.
    Music,
    /// Outdoor adventures.
    Outdoor,
    /// Board games and gaming.
    Games,
    /// Workshops and learning.
    Learning,
    /// Wellness and mindfulness.
    Wellness,
}

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategoryError(pub String);

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Sports,
        Self::Food,
        Self::Art,
        Self::Music,
        Self::Outdoor,
        Self::Games,
        Self::Learning,
        Self::Wellness,
    ];

    /// Return the stable upper-case identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sports => "SPORTS",
            Self::Food => "FOOD",
            Self::Art => "ART",
            Self::Music => "MUSIC",
            Self::Outdoor => "OUTDOOR",
            Self::Games => "GAMES",
            Self::Learning => "LEARNING",
            Self::Wellness => "WELLNESS",
        }
    }

    /// Return the capitalised label used in user-facing reasons.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sports => "Sports",
            Self::Food => "Food",
            Self::Art => "Art",
            Self::Music => "Music",
            Self::Outdoor => "Outdoor",
            Self::Games => "Games",
            Self::Learning => "Learning",
            Self::Wellness => "Wellness",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = UnknownCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCategoryError(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[test]
    fn display_matches_as_str() {
        assert_eq!(Category::Art.to_string(), Category::Art.as_str());
    }

    #[rstest]
    #[case("SPORTS", Category::Sports)]
    #[case("wellness", Category::Wellness)]
    #[case(" Food ", Category::Food)]
    fn parsing_ignores_case_and_padding(#[case] raw: &str, #[case] expected: Category) {
        assert_eq!(Category::from_str(raw), Ok(expected));
    }

    #[test]
    fn parsing_rejects_unknown() {
        let err = Category::from_str("karaoke").unwrap_err();
        assert!(err.to_string().contains("unknown category"));
    }

    #[test]
    fn serde_uses_upper_case_names() {
        let json = serde_json::to_string(&Category::Outdoor).unwrap();
        assert_eq!(json, "\"OUTDOOR\"");
    }
}
