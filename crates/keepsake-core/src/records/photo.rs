use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{de_id, null_as_default, require_text};
use crate::error::ValidationError;
use crate::gateway::Query;

pub const DEFAULT_ALBUM: &str = "default";

fn default_album() -> String {
    DEFAULT_ALBUM.into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub image_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub caption: String,
    #[serde(default = "default_album")]
    pub album: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_favorite: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoDraft {
    pub image_url: String,
    pub caption: String,
    pub album: String,
}

impl PhotoDraft {
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            caption: String::new(),
            album: default_album(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("image_url", &self.image_url)?;
        require_text("album", &self.album)
    }
}

/// Newest first, optionally narrowed to one album or to favorites.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoFilter {
    pub album: Option<String>,
    pub is_favorite: Option<bool>,
}

impl PhotoFilter {
    pub fn to_query(&self) -> Query {
        let mut query = Query::new().order_desc("created_at");
        if let Some(album) = &self.album {
            query = query.eq("album", album.as_str());
        }
        if let Some(fav) = self.is_favorite {
            query = query.eq("is_favorite", fav);
        }
        query
    }
}
