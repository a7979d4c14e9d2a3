use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{de_id, normalize_tags, null_as_default, push_tag, require_text};
use crate::error::ValidationError;
use crate::gateway::Query;

/// Card colors offered for ideas. The first is the default.
pub const IDEA_COLORS: [&str; 6] = [
    "#b76e79", "#ff6090", "#ffd700", "#6b8cae", "#8b7aa8", "#90a955",
];

fn default_color() -> String {
    IDEA_COLORS[0].into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_pinned: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_archived: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaDraft {
    pub title: String,
    pub content: String,
    pub color: String,
    pub tags: Vec<String>,
}

impl Default for IdeaDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            color: default_color(),
            tags: Vec::new(),
        }
    }
}

impl IdeaDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Only the title is required.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)
    }

    pub fn add_tag(&mut self, tag: &str) -> bool {
        push_tag(&mut self.tags, tag)
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    pub(crate) fn normalized(&self) -> Self {
        Self {
            tags: normalize_tags(&self.tags),
            ..self.clone()
        }
    }
}

impl From<&Idea> for IdeaDraft {
    fn from(idea: &Idea) -> Self {
        Self {
            title: idea.title.clone(),
            content: idea.content.clone(),
            color: idea.color.clone(),
            tags: idea.tags.clone(),
        }
    }
}

/// Pinned first, then newest, within the archived or active set.
pub fn ideas_query(show_archived: bool) -> Query {
    Query::new()
        .eq("is_archived", show_archived)
        .order_desc("is_pinned")
        .order_desc("created_at")
}
