use serde::{Deserialize, Serialize};

/// The signed-in principal as persisted with the session. Stored as JSON
/// under the session's identity key; parsed back on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: i64,
    pub username: String,
}
