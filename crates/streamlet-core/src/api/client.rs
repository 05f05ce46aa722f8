//! API client for the microblog service.
//!
//! One method per server operation, each delegating to the
//! [`RequestGateway`] for token decoration and error mapping. Listings are
//! normalized through [`Listing`] so callers always receive a `Vec`; an
//! empty collection is a normal result, never an error.

use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::auth::{token, SessionStore};
use crate::models::{Listing, Post, Stream, UserIdentity};
use crate::validate;

use super::gateway::RequestGateway;
use super::ApiError;

/// Default page size for post listings
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Deserialize)]
struct SignInResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: i64,
    username: String,
}

pub struct ApiClient {
    gateway: RequestGateway,
}

impl ApiClient {
    pub fn new(gateway: RequestGateway) -> Self {
        Self { gateway }
    }

    pub fn session(&self) -> &SessionStore {
        self.gateway.session()
    }

    /// Sign in and establish a session.
    ///
    /// The token is persisted as soon as the service issues it; the
    /// identity is resolved afterwards via the user lookup, falling back to
    /// the token's own subject claim when the lookup fails. When neither
    /// yields an identity the session keeps the token with no identity
    /// record, and posting stays unavailable until a successful re-login.
    pub async fn sign_in(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserIdentity>, ApiError> {
        let body = json!({ "username": username, "password": password });
        let response: SignInResponse = self
            .gateway
            .post_json_anonymous("/auth/signin", &body)
            .await?;

        self.session()
            .set_token(&response.access_token)
            .map_err(ApiError::storage)?;

        let identity = match self.current_user(username).await {
            Ok(identity) => Some(identity),
            Err(err) => {
                warn!(error = %err, "User lookup failed, falling back to token subject");
                token::subject_id(&response.access_token).map(|id| UserIdentity {
                    id,
                    username: username.to_string(),
                })
            }
        };

        match identity {
            Some(ref identity) => self
                .session()
                .set_identity(identity)
                .map_err(ApiError::storage)?,
            None => warn!("Signed in without a resolved user identity"),
        }

        Ok(identity)
    }

    /// Register a new account. The created-user body is not used beyond
    /// confirming success; the caller signs in separately.
    pub async fn sign_up(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        let body = json!({ "username": username, "email": email, "password": password });
        let _created: serde_json::Value = self
            .gateway
            .post_json_anonymous("/auth/signup", &body)
            .await?;
        Ok(())
    }

    /// Look up a user by username (bearer-authenticated).
    pub async fn current_user(&self, username: &str) -> Result<UserIdentity, ApiError> {
        let user: ApiUser = self
            .gateway
            .get_json(&format!("/users/username/{username}"))
            .await?;
        Ok(UserIdentity {
            id: user.id,
            username: user.username,
        })
    }

    /// Discard the local session. Purely local; the token is simply
    /// forgotten.
    pub fn sign_out(&self) -> Result<(), ApiError> {
        self.session().clear().map_err(ApiError::storage)
    }

    pub async fn list_posts(&self, page: u32, size: u32) -> Result<Vec<Post>, ApiError> {
        let listing: Listing<Post> = self
            .gateway
            .get_json(&format!("/posts?page={page}&size={size}"))
            .await?;
        Ok(listing.into_items())
    }

    pub async fn list_posts_by_stream(
        &self,
        stream_id: i64,
        page: u32,
        size: u32,
    ) -> Result<Vec<Post>, ApiError> {
        let listing: Listing<Post> = self
            .gateway
            .get_json(&format!("/posts/stream/{stream_id}?page={page}&size={size}"))
            .await?;
        Ok(listing.into_items())
    }

    /// Create a post in a stream. Content is validated locally first; the
    /// author id comes from the stored identity, and a missing identity
    /// fails before any network call.
    pub async fn create_post(&self, stream_id: i64, content: &str) -> Result<Post, ApiError> {
        let content = validate::post_content(content)?;
        let user = self
            .session()
            .user_identity()
            .ok_or(ApiError::AuthenticationRequired)?;

        let body = json!({ "content": content });
        self.gateway
            .post_json(
                &format!("/posts/user/{}/stream/{}", user.id, stream_id),
                &body,
            )
            .await
    }

    pub async fn list_streams(&self) -> Result<Vec<Stream>, ApiError> {
        let listing: Listing<Stream> = self.gateway.get_json("/streams").await?;
        Ok(listing.into_items())
    }

    pub async fn get_stream(&self, id: i64) -> Result<Stream, ApiError> {
        self.gateway.get_json(&format!("/streams/{id}")).await
    }

    /// Create a stream. The name is validated locally first.
    pub async fn create_stream(&self, name: &str, description: &str) -> Result<Stream, ApiError> {
        let (name, description) = validate::stream_fields(name, description)?;
        let body = json!({ "name": name, "description": description });
        self.gateway.post_json("/streams", &body).await
    }
}
