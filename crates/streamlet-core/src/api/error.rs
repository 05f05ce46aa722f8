use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// A protected call was attempted with no stored token; no request was
    /// issued.
    #[error("Authentication required - please sign in")]
    AuthenticationRequired,

    /// The service rejected the stored token as invalid or expired.
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// Client-side validation rejected the input before any network call.
    #[error("{0}")]
    Validation(String),

    /// Non-success response from the service.
    #[error("{message}")]
    Remote { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Map a non-success status and its body to an error.
    ///
    /// The service reports failures as JSON `{"message": "..."}`; anything
    /// else falls back to a generic message so callers always have
    /// something readable to surface.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("Request failed with status {status}"));
        ApiError::Remote {
            status: status.as_u16(),
            message,
        }
    }

    pub(crate) fn storage(err: anyhow::Error) -> Self {
        ApiError::Storage(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn server_message_wins() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"message": "Post cannot exceed 140 characters"}"#,
        );
        match err {
            ApiError::Remote { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Post cannot exceed 140 characters");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unparseable_body_falls_back_to_generic_message() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        match err {
            ApiError::Remote { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("500"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_message_field_falls_back() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"message": ""}"#);
        match err {
            ApiError::Remote { message, .. } => assert!(message.contains("404")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
