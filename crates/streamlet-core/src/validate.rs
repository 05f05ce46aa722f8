//! Client-side validation, run before any network call.
//!
//! The service enforces the same limits; checking here keeps obviously bad
//! input off the wire and gives the user the message immediately.

use crate::api::ApiError;
use crate::models::post::MAX_POST_CHARS;

/// Validate and normalize post content: trimmed, non-empty, at most 140
/// characters. Exactly 140 is accepted.
pub fn post_content(content: &str) -> Result<String, ApiError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation(
            "Post content cannot be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_POST_CHARS {
        return Err(ApiError::Validation(
            "Post cannot exceed 140 characters".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate and normalize a new stream's fields. The description is
/// optional; it is trimmed and passed through.
pub fn stream_fields(name: &str, description: &str) -> Result<(String, String), ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation(
            "Stream name cannot be empty".to_string(),
        ));
    }
    Ok((name.to_string(), description.trim().to_string()))
}
