//! Data models for the microblog service.
//!
//! - `Post`: a short message in a stream
//! - `Stream`: a named topic channel
//! - `UserIdentity`: the signed-in principal as persisted with the session
//! - `Listing`: normalization of the service's two listing shapes
//!
//! Posts and streams are render-only copies; every view re-fetches them.

pub mod page;
pub mod post;
pub mod stream;
pub mod user;

pub use page::Listing;
pub use post::Post;
pub use stream::Stream;
pub use user::UserIdentity;
