//! Authentication module for managing user sessions and credentials.
//!
//! This module provides:
//! - `SessionStore`: durable persistence of the bearer token and identity
//! - `CredentialStore`: secure OS-level credential storage via keyring
//! - `token`: best-effort identity recovery from the token payload
//!
//! A session is a presence-based record: holding a token means "signed in"
//! until the service says otherwise with a 401.

pub mod credentials;
pub mod session;
pub mod token;

pub use credentials::CredentialStore;
pub use session::SessionStore;
