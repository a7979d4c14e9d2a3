//! Typed shapes of the persisted records.
//!
//! Field names match the remote columns verbatim. Ids arrive as JSON
//! strings or integers depending on the table and are carried as strings.

pub mod idea;
pub mod mood;
pub mod photo;
pub mod post;
pub mod prompt;

pub use idea::{Idea, IdeaDraft, IDEA_COLORS};
pub use mood::{CalendarCell, Mood, MoodCalendar, MoodEntry, MoodType};
pub use photo::{Photo, PhotoDraft, PhotoFilter};
pub use post::{FeedFilter, Post, PostDraft, PostFilter, PostStatus, PostType};
pub use prompt::WritingPrompt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ValidationError;

/// Accept a string or integer id.
pub(crate) fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or integer id, got {other}"
        ))),
    }
}

/// Treat an explicit `null` column like a missing one.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Trimmed, non-blank text.
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Blank { field })
    } else {
        Ok(())
    }
}

/// Append a trimmed tag unless it is blank or already present.
pub(crate) fn push_tag(tags: &mut Vec<String>, tag: &str) -> bool {
    let tag = tag.trim();
    if tag.is_empty() || tags.iter().any(|t| t == tag) {
        return false;
    }
    tags.push(tag.to_string());
    true
}

/// Trim every tag, dropping blanks and later duplicates.
pub(crate) fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(tags.len());
    for tag in tags {
        push_tag(&mut out, tag);
    }
    out
}
