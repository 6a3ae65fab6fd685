use serde::{Deserialize, Serialize};

/// Opaque pagination continuation token.
///
/// The token's structure is owned entirely by the store implementation that
/// issued it; engines and callers pass it back uninterpreted to resume a
/// scan where the previous page left off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(pub String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Cursor {
    fn from(token: String) -> Self {
        Self(token)
    }
}
