//! REST API client module for the microblog service.
//!
//! `RequestGateway` owns the transport policy: bearer-token decoration,
//! the anonymous-read allowance for public endpoints, and the mapping of
//! every failure to a typed `ApiError`. `ApiClient` sits on top with one
//! method per server operation.

pub mod client;
pub mod error;
pub mod gateway;

pub use client::ApiClient;
pub use error::ApiError;
pub use gateway::{RequestGateway, SignInPrompt};
