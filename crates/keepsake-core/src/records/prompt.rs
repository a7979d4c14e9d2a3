use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{de_id, null_as_default};

/// How many unused prompts a random pick chooses among.
pub const PROMPT_POOL: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WritingPrompt {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub prompt: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_used: bool,
    #[serde(default)]
    pub used_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_unused_prompt() {
        let p: WritingPrompt = serde_json::from_value(json!({
            "id": 3,
            "prompt": "Describe our first date",
            "category": "memories",
            "is_used": false,
            "used_at": null
        }))
        .unwrap();
        assert_eq!(p.id, "3");
        assert!(!p.is_used);
        assert!(p.used_at.is_none());
    }
}
