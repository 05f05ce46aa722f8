use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stream {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<NaiveDateTime>,
}

impl Stream {
    pub fn description_display(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or("No description")
    }

    pub fn created_display(&self) -> String {
        match self.created_at {
            Some(at) => at.format("%Y-%m-%d").to_string(),
            None => "n/a".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_json() {
        let json = r#"{
            "id": 2,
            "name": "general",
            "description": "Anything goes",
            "createdAt": "2025-01-02T10:00:00"
        }"#;

        let stream: Stream = serde_json::from_str(json).unwrap();
        assert_eq!(stream.name, "general");
        assert_eq!(stream.description_display(), "Anything goes");
        assert_eq!(stream.created_display(), "2025-01-02");
    }

    #[test]
    fn empty_description_falls_back() {
        let json = r#"{"id": 1, "name": "misc", "description": ""}"#;
        let stream: Stream = serde_json::from_str(json).unwrap();
        assert_eq!(stream.description_display(), "No description");
        assert_eq!(stream.created_display(), "n/a");
    }
}
