//! Content catalog types and the recommendation ordering.

use crate::types::{text_enum, ContentId};
use serde::{Deserialize, Serialize};

/// Maximum number of items returned by a recommendation request.
pub const RECOMMENDATION_LIMIT: usize = 10;

text_enum! {
    Difficulty ("difficulty") {
        Beginner => "beginner",
        Intermediate => "intermediate",
        Advanced => "advanced",
    }
}

impl Difficulty {
    /// Recommendation rank: easier content first.
    pub fn rank(self) -> u8 {
        match self {
            Difficulty::Beginner     => 1,
            Difficulty::Intermediate => 2,
            Difficulty::Advanced     => 3,
        }
    }
}

text_enum! {
    ContentType ("content type") {
        Video => "video",
        Quiz => "quiz",
        Reading => "reading",
    }
}

/// A learning activity as stored and served.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentItem {
    pub id:               ContentId,
    pub title:            String,
    pub subject:          String,
    pub content_type:     ContentType,
    pub difficulty:       Difficulty,
    pub duration_minutes: u32,
    pub description:      String,
    pub thumbnail_url:    String,
    pub created_at:       String,
}

/// Optional, ANDed listing filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentFilter {
    pub subject:      Option<String>,
    pub difficulty:   Option<Difficulty>,
    pub content_type: Option<ContentType>,
}

impl ContentFilter {
    /// Build a filter from raw query-string values. Empty strings mean "no filter".
    pub fn parse(
        subject: Option<&str>,
        difficulty: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<Self, crate::types::UnknownVariant> {
        Ok(Self {
            subject: non_empty(subject).map(str::to_string),
            difficulty: non_empty(difficulty).map(str::parse::<Difficulty>).transpose()?,
            content_type: non_empty(content_type).map(str::parse::<ContentType>).transpose()?,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Order candidate items for a learner: only their subjects, easiest first,
/// newest first within a difficulty, capped at [`RECOMMENDATION_LIMIT`].
pub fn recommend(mut items: Vec<ContentItem>, subjects: &[String]) -> Vec<ContentItem> {
    items.retain(|c| subjects.iter().any(|s| s == &c.subject));
    items.sort_by(|a, b| {
        a.difficulty
            .rank()
            .cmp(&b.difficulty.rank())
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| a.title.cmp(&b.title))
    });
    items.truncate(RECOMMENDATION_LIMIT);
    items
}
