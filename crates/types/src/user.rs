use serde::{Deserialize, Serialize};

/// Identity and contact record. Engines only ever reference `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,

    pub phone_number: String,

    /// Unix timestamp (seconds)
    pub created_at: u64,
}

impl User {
    pub fn new(
        user_id: impl Into<String>,
        phone_number: impl Into<String>,
        created_at: u64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            phone_number: phone_number.into(),
            created_at,
        }
    }
}
