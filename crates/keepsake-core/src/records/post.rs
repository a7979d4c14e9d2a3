//! Poems, journal entries and written ideas.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{de_id, normalize_tags, null_as_default, push_tag, require_text};
use crate::error::ValidationError;
use crate::gateway::Query;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    #[default]
    Poem,
    Journal,
    Idea,
}

impl PostType {
    pub fn as_str(self) -> &'static str {
        match self {
            PostType::Poem => "poem",
            PostType::Journal => "journal",
            PostType::Idea => "idea",
        }
    }
}

impl FromStr for PostType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "poem" => Ok(PostType::Poem),
            "journal" => Ok(PostType::Journal),
            "idea" => Ok(PostType::Idea),
            _ => Err(ValidationError::InvalidValue {
                field: "type".into(),
                message: format!("unknown post type '{s}'"),
            }),
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl FromStr for PostStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            _ => Err(ValidationError::InvalidValue {
                field: "status".into(),
                message: format!("unknown status '{s}'"),
            }),
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(rename = "type", default)]
    pub post_type: PostType,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub media_urls: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_favorite: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Editable fields of a post, as sent on create and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub status: PostStatus,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    pub media_urls: Vec<String>,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Title and content must not be blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_text("content", &self.content)
    }

    /// Returns false when the tag is blank or already present.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        push_tag(&mut self.tags, tag)
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    pub fn remove_media(&mut self, url: &str) -> bool {
        let before = self.media_urls.len();
        self.media_urls.retain(|u| u != url);
        self.media_urls.len() != before
    }

    /// Copy with tags normalized, ready to send.
    pub(crate) fn normalized(&self) -> Self {
        Self {
            tags: normalize_tags(&self.tags),
            ..self.clone()
        }
    }
}

impl From<&Post> for PostDraft {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            content: post.content.clone(),
            post_type: post.post_type,
            status: post.status,
            tags: post.tags.clone(),
            featured_image: post.featured_image.clone(),
            media_urls: post.media_urls.clone(),
        }
    }
}

/// Server-side filters for listing posts. Newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    pub post_type: Option<PostType>,
    pub is_favorite: Option<bool>,
}

impl PostFilter {
    pub fn to_query(&self) -> Query {
        let mut query = Query::new().order_desc("created_at");
        if let Some(status) = self.status {
            query = query.eq("status", status.as_str());
        }
        if let Some(post_type) = self.post_type {
            query = query.eq("type", post_type.as_str());
        }
        if let Some(fav) = self.is_favorite {
            query = query.eq("is_favorite", fav);
        }
        query
    }
}

/// Feed tabs, applied to an already-loaded list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedFilter {
    #[default]
    All,
    Published,
    Draft,
    Favorite,
}

impl FeedFilter {
    pub fn matches(self, post: &Post) -> bool {
        match self {
            FeedFilter::All => true,
            FeedFilter::Published => post.status == PostStatus::Published,
            FeedFilter::Draft => post.status == PostStatus::Draft,
            FeedFilter::Favorite => post.is_favorite,
        }
    }

    pub fn apply(self, posts: &[Post]) -> Vec<&Post> {
        posts.iter().filter(|p| self.matches(p)).collect()
    }
}

impl FromStr for FeedFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(FeedFilter::All),
            "published" => Ok(FeedFilter::Published),
            "draft" => Ok(FeedFilter::Draft),
            "favorite" => Ok(FeedFilter::Favorite),
            _ => Err(ValidationError::InvalidValue {
                field: "filter".into(),
                message: format!("unknown feed filter '{s}'"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post(id: &str, status: PostStatus, fav: bool) -> Post {
        Post {
            id: id.into(),
            title: "t".into(),
            content: "c".into(),
            post_type: PostType::Poem,
            status,
            tags: vec![],
            featured_image: None,
            media_urls: vec![],
            is_favorite: fav,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn parses_remote_row() {
        let row = json!({
            "id": 5,
            "title": "Roses",
            "content": "are red",
            "type": "poem",
            "status": "published",
            "tags": ["us"],
            "featured_image": null,
            "media_urls": null,
            "is_favorite": false,
            "created_at": "2026-02-14T09:00:00.000000+00:00",
            "updated_at": "2026-02-14T09:00:00+00:00"
        });
        let post: Post = serde_json::from_value(row).unwrap();
        assert_eq!(post.id, "5");
        assert_eq!(post.status, PostStatus::Published);
        assert!(post.media_urls.is_empty());
        assert!(post.created_at.is_some());
    }

    #[test]
    fn draft_serializes_type_column() {
        let draft = PostDraft::new("Hi", "there");
        let fields = serde_json::to_value(&draft).unwrap();
        assert_eq!(fields["type"], "poem");
        assert_eq!(fields["status"], "draft");
        assert!(fields.get("featured_image").is_none());
    }

    #[test]
    fn validate_requires_title_and_content() {
        assert_eq!(
            PostDraft::new("  ", "x").validate(),
            Err(ValidationError::Blank { field: "title" })
        );
        assert_eq!(
            PostDraft::new("x", "\n").validate(),
            Err(ValidationError::Blank { field: "content" })
        );
        assert!(PostDraft::new("x", "y").validate().is_ok());
    }

    #[test]
    fn tags_trim_and_dedupe() {
        let mut draft = PostDraft::default();
        assert!(draft.add_tag(" love "));
        assert!(!draft.add_tag("love"));
        assert!(!draft.add_tag("   "));
        assert_eq!(draft.tags, vec!["love"]);
        assert!(draft.remove_tag("love"));
        assert!(!draft.remove_tag("love"));
    }

    #[test]
    fn filter_builds_query() {
        let query = PostFilter {
            status: Some(PostStatus::Draft),
            is_favorite: Some(true),
            ..PostFilter::default()
        }
        .to_query();
        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.order[0].column, "created_at");
        assert!(query.order[0].descending);
    }

    #[test]
    fn feed_filter_tabs() {
        let posts = vec![
            post("1", PostStatus::Draft, false),
            post("2", PostStatus::Published, true),
            post("3", PostStatus::Published, false),
        ];
        assert_eq!(FeedFilter::All.apply(&posts).len(), 3);
        assert_eq!(FeedFilter::Published.apply(&posts).len(), 2);
        assert_eq!(FeedFilter::Draft.apply(&posts)[0].id, "1");
        assert_eq!(FeedFilter::Favorite.apply(&posts)[0].id, "2");
        assert_eq!("favorite".parse::<FeedFilter>().unwrap(), FeedFilter::Favorite);
        assert!("pinned".parse::<FeedFilter>().is_err());
    }
}
