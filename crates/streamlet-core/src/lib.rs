//! streamlet-core: a thin client for streams-and-posts microblog services.
//!
//! This crate owns everything below the user interface:
//!
//! - [`auth::SessionStore`]: durable persistence of the bearer token and
//!   the signed-in user's identity
//! - [`api::RequestGateway`]: token decoration and the anonymous-read
//!   policy for outbound HTTP calls
//! - [`api::ApiClient`]: one method per server operation
//! - [`models`]: render-ready copies of the service's posts and streams
//!
//! The service itself is remote; nothing here caches its data beyond the
//! current call.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod storage;
pub mod validate;
