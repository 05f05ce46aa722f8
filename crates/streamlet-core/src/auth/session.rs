//! Session persistence.
//!
//! The session is two values in durable storage: the raw bearer token and
//! the JSON-encoded identity of the signed-in user. Nothing is cached in
//! memory; every accessor re-reads the backing store, so a session cleared
//! by another process is observed on the next call.

use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use crate::models::UserIdentity;
use crate::storage::KeyValueStore;

/// Storage key for the raw bearer token
const TOKEN_KEY: &str = "auth_token";

/// Storage key for the JSON-encoded user identity
const USER_KEY: &str = "auth_user";

#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persist a full session, overwriting any prior one. The token is an
    /// opaque credential; its shape is not validated.
    pub fn establish(&self, token: &str, identity: &UserIdentity) -> Result<()> {
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(USER_KEY, &serde_json::to_string(identity)?)?;
        Ok(())
    }

    /// Persist the token alone. Sign-in stores the token first and resolves
    /// the identity afterwards, so a token may exist without one.
    pub fn set_token(&self, token: &str) -> Result<()> {
        self.store.set(TOKEN_KEY, token)
    }

    /// Persist the identity record. An identity is never written without a
    /// corresponding token; without one this is a no-op.
    pub fn set_identity(&self, identity: &UserIdentity) -> Result<()> {
        if self.token()?.is_none() {
            warn!("Refusing to store identity without a session token");
            return Ok(());
        }
        self.store.set(USER_KEY, &serde_json::to_string(identity)?)
    }

    pub fn token(&self) -> Result<Option<String>> {
        self.store.get(TOKEN_KEY)
    }

    /// The stored identity, or `None` when missing or unparseable.
    pub fn user_identity(&self) -> Option<UserIdentity> {
        let raw = self.store.get(USER_KEY).ok().flatten()?;
        serde_json::from_str(&raw).ok()
    }

    /// Remove both persisted values. Clearing an empty store is a no-op.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        Ok(())
    }

    /// Remove the token only. The 401 pathway invalidates the credential
    /// but leaves the identity record in place until the next sign-in.
    pub fn clear_token(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)
    }

    /// Presence check only; no local validity or expiry verification.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.token(), Ok(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn session() -> SessionStore {
        SessionStore::new(Arc::new(MemoryStore::new()))
    }

    fn ada() -> UserIdentity {
        UserIdentity {
            id: 3,
            username: "ada".to_string(),
        }
    }

    #[test]
    fn establish_round_trips() {
        let session = session();
        session.establish("tok-123", &ada()).unwrap();

        assert_eq!(session.token().unwrap().as_deref(), Some("tok-123"));
        assert_eq!(session.user_identity(), Some(ada()));
        assert!(session.is_authenticated());
    }

    #[test]
    fn establish_overwrites_prior_session() {
        let session = session();
        session.establish("old", &ada()).unwrap();
        let grace = UserIdentity {
            id: 9,
            username: "grace".to_string(),
        };
        session.establish("new", &grace).unwrap();

        assert_eq!(session.token().unwrap().as_deref(), Some("new"));
        assert_eq!(session.user_identity(), Some(grace));
    }

    #[test]
    fn clear_is_idempotent() {
        let session = session();
        session.clear().unwrap();
        assert_eq!(session.token().unwrap(), None);

        session.establish("tok", &ada()).unwrap();
        session.clear().unwrap();
        session.clear().unwrap();

        assert_eq!(session.token().unwrap(), None);
        assert_eq!(session.user_identity(), None);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn clear_token_leaves_identity() {
        let session = session();
        session.establish("tok", &ada()).unwrap();
        session.clear_token().unwrap();

        assert_eq!(session.token().unwrap(), None);
        assert!(!session.is_authenticated());
        assert_eq!(session.user_identity(), Some(ada()));
    }

    #[test]
    fn identity_is_not_written_without_token() {
        let session = session();
        session.set_identity(&ada()).unwrap();
        assert_eq!(session.user_identity(), None);

        session.set_token("tok").unwrap();
        session.set_identity(&ada()).unwrap();
        assert_eq!(session.user_identity(), Some(ada()));
    }

    #[test]
    fn malformed_identity_parses_to_absent() {
        let store = Arc::new(MemoryStore::new());
        store.set("auth_token", "tok").unwrap();
        store.set("auth_user", "{not json").unwrap();

        let session = SessionStore::new(store);
        assert_eq!(session.user_identity(), None);
        // The token itself is untouched by a bad identity record
        assert!(session.is_authenticated());
    }

    #[test]
    fn token_presence_is_the_only_auth_check() {
        let session = session();
        // Any non-empty string counts; no shape validation
        session.set_token("definitely-not-a-jwt").unwrap();
        assert!(session.is_authenticated());
    }
}
