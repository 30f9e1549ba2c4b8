use serde::{Deserialize, Serialize};

/// A user row as stored in a shard.
///
/// `id` is supplied by the caller and is never generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub payload: String,
}

impl UserRecord {
    pub fn new(id: i64, username: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            payload: payload.into(),
        }
    }
}

/// File name of the database backing shard `index`.
pub fn shard_file_name(index: usize) -> String {
    format!("shard_{index}.db")
}

/// Parses a user id from its textual form (e.g. a query parameter).
///
/// Only plain base-10 integers are accepted; surrounding whitespace is not.
pub fn parse_user_id(raw: &str) -> Option<i64> {
    raw.parse().ok()
}
