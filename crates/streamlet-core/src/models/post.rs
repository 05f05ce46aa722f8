use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Maximum post length in characters, enforced client-side before any
/// network call and again by the service.
pub const MAX_POST_CHARS: usize = 140;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub content: String,
    #[serde(rename = "streamId")]
    pub stream_id: i64,
    #[serde(rename = "streamName", default)]
    pub stream_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<NaiveDateTime>,
}

impl Post {
    pub fn author_display(&self) -> String {
        match self.username {
            Some(ref name) => format!("@{}", name),
            None => "@unknown".to_string(),
        }
    }

    pub fn created_display(&self) -> String {
        match self.created_at {
            Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
            None => "n/a".to_string(),
        }
    }
}
