//! Authenticated request gateway.
//!
//! Every outbound call goes through here. The gateway decorates requests
//! with the session's bearer token, lets anonymous reads through to the
//! public endpoints, and maps every non-success response to a typed
//! [`ApiError`] at this one boundary so call sites never inspect raw
//! responses.
//!
//! A 401 from the service means the token is no longer good: the gateway
//! drops it from the session (the identity record stays), notifies the
//! sign-in prompt, and surfaces `ApiError::SessionExpired`.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::SessionStore;

use super::ApiError;

/// Notified when a call needs a signed-in user. The front-end reacts by
/// prompting for credentials; the default does nothing.
pub trait SignInPrompt: Send + Sync {
    fn request_sign_in(&self);
}

struct NoPrompt;

impl SignInPrompt for NoPrompt {
    fn request_sign_in(&self) {}
}

pub struct RequestGateway {
    http: Client,
    base_url: String,
    session: SessionStore,
    prompt: Arc<dyn SignInPrompt>,
}

impl RequestGateway {
    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Result<Self, ApiError> {
        Self::with_prompt(base_url, session, Arc::new(NoPrompt))
    }

    pub fn with_prompt(
        base_url: impl Into<String>,
        session: SessionStore,
        prompt: Arc<dyn SignInPrompt>,
    ) -> Result<Self, ApiError> {
        // No client-level timeout: a hung call blocks only the command that
        // issued it.
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            prompt,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Issue a request for `path` (relative to the base URL, query string
    /// allowed), applying the token policy: decorate when a token exists,
    /// allow anonymous public reads, reject everything else up front.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        extra_headers: HeaderMap,
    ) -> Result<Response, ApiError> {
        let token = self.session.token().map_err(ApiError::storage)?;

        if token.is_none() && !permits_anonymous(&method, path) {
            debug!(%method, path, "Rejecting unauthenticated protected call");
            self.prompt.request_sign_in();
            return Err(ApiError::AuthenticationRequired);
        }

        let headers = decorated_headers(extra_headers, token.as_deref())?;
        let response = self.issue(method, path, body, headers).await?;
        self.check_response(response).await
    }

    /// Issue a request outside the token policy, with no decoration. The
    /// auth endpoints (sign-in, sign-up) are called before any session
    /// exists, and a 401 from them means bad credentials, not an expired
    /// session.
    pub async fn send_anonymous(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, ApiError> {
        let response = self.issue(method, path, body, HeaderMap::new()).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        warn!(status = %status, body = %text, "Error response from server");
        Err(ApiError::from_status(status, &text))
    }

    async fn issue(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        headers: HeaderMap,
    ) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    async fn check_response(&self, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        Err(self.handle_failure(status, &text))
    }

    /// Map a non-success status on an authenticated call. A 401 drops the
    /// stored token and requests a fresh sign-in.
    fn handle_failure(&self, status: StatusCode, body: &str) -> ApiError {
        warn!(status = %status, body = %body, "Error response from server");
        if status == StatusCode::UNAUTHORIZED {
            if let Err(err) = self.session.clear_token() {
                return ApiError::storage(err);
            }
            self.prompt.request_sign_in();
            return ApiError::SessionExpired;
        }
        ApiError::from_status(status, body)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(Method::GET, path, None, HeaderMap::new()).await?;
        decode(response, path).await
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = to_body(body)?;
        let response = self
            .send(Method::POST, path, Some(&body), HeaderMap::new())
            .await?;
        decode(response, path).await
    }

    pub async fn post_json_anonymous<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = to_body(body)?;
        let response = self.send_anonymous(Method::POST, path, Some(&body)).await?;
        decode(response, path).await
    }
}

fn to_body<B: Serialize>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ApiError> {
    response
        .json()
        .await
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response from {path}: {e}")))
}

/// Reads the public deployment serves without authentication: the post
/// listings and the stream listing/detail. Everything else needs a token.
fn permits_anonymous(method: &Method, path: &str) -> bool {
    if *method != Method::GET {
        return false;
    }
    let path = match path.split_once('?') {
        Some((path, _query)) => path,
        None => path,
    };
    path == "/posts"
        || path.starts_with("/posts/stream/")
        || path == "/streams"
        || path.starts_with("/streams/")
}

/// Merge the caller's headers with the bearer decoration. Caller-supplied
/// headers are preserved; only `Authorization` is set.
fn decorated_headers(mut headers: HeaderMap, token: Option<&str>) -> Result<HeaderMap, ApiError> {
    if let Some(token) = token {
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| ApiError::Storage(format!("Stored token is not a valid header value: {e}")))?;
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use reqwest::header::HeaderName;

    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};

    #[test]
    fn anonymous_policy_permits_public_reads_only() {
        assert!(permits_anonymous(&Method::GET, "/posts"));
        assert!(permits_anonymous(&Method::GET, "/posts?page=0&size=10"));
        assert!(permits_anonymous(&Method::GET, "/posts/stream/7?page=1&size=5"));
        assert!(permits_anonymous(&Method::GET, "/streams"));
        assert!(permits_anonymous(&Method::GET, "/streams/3"));

        assert!(!permits_anonymous(&Method::POST, "/streams"));
        assert!(!permits_anonymous(&Method::POST, "/posts/user/1/stream/2"));
        assert!(!permits_anonymous(&Method::GET, "/users/username/ada"));
        assert!(!permits_anonymous(&Method::GET, "/postscript"));
    }

    #[test]
    fn bearer_decoration_preserves_caller_headers() {
        let mut extra = HeaderMap::new();
        extra.insert(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("abc-123"),
        );

        let headers = decorated_headers(extra, Some("tok-99")).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok-99");
        assert_eq!(headers.get("x-request-id").unwrap(), "abc-123");
    }

    #[test]
    fn no_token_means_no_decoration() {
        let headers = decorated_headers(HeaderMap::new(), None).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    struct CountingPrompt(AtomicUsize);

    impl SignInPrompt for CountingPrompt {
        fn request_sign_in(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn protected_call_without_token_is_rejected_before_any_io() {
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        let prompt = Arc::new(CountingPrompt(AtomicUsize::new(0)));
        // The port is never dialed: rejection happens before the request
        // is built.
        let gateway =
            RequestGateway::with_prompt("http://127.0.0.1:1/api", session, prompt.clone()).unwrap();

        let err = gateway
            .send(Method::POST, "/streams", None, HeaderMap::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::AuthenticationRequired));
        assert_eq!(prompt.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn a_401_clears_the_token_but_not_the_identity() {
        let store = Arc::new(MemoryStore::new());
        store.set("auth_token", "stale-token").unwrap();
        store
            .set("auth_user", r#"{"id":3,"username":"ada"}"#)
            .unwrap();

        let session = SessionStore::new(store);
        let prompt = Arc::new(CountingPrompt(AtomicUsize::new(0)));
        let gateway =
            RequestGateway::with_prompt("http://127.0.0.1:1/api", session, prompt.clone())
                .unwrap();

        let err = gateway.handle_failure(StatusCode::UNAUTHORIZED, "");

        assert!(matches!(err, ApiError::SessionExpired));
        assert_eq!(prompt.0.load(Ordering::SeqCst), 1);
        assert!(!gateway.session().is_authenticated());
        assert!(gateway.session().user_identity().is_some());
    }

    #[test]
    fn non_401_failures_leave_the_session_alone() {
        let store = Arc::new(MemoryStore::new());
        store.set("auth_token", "good-token").unwrap();

        let session = SessionStore::new(store);
        let gateway = RequestGateway::new("http://127.0.0.1:1/api", session).unwrap();

        let err = gateway.handle_failure(
            StatusCode::BAD_REQUEST,
            r#"{"message": "Stream name already exists"}"#,
        );

        match err {
            ApiError::Remote { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Stream name already exists");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(gateway.session().is_authenticated());
    }
}
