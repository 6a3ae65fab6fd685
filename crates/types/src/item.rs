use serde::{Deserialize, Serialize};

/// Lifecycle state of a listed item.
///
/// `Exchanged` is terminal: it is set only by a successful settlement and
/// never reverts to `Available`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Available,
    Exchanged,
}

/// A good a user owns and may offer for exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier
    pub item_id: String,

    /// Owner's user id
    pub user_id: String,

    /// Free-form category tag used by discovery filtering
    pub category: String,

    pub status: ItemStatus,

    /// Unix timestamp (seconds)
    pub created_at: u64,
}

impl Item {
    pub fn new(
        item_id: impl Into<String>,
        user_id: impl Into<String>,
        category: impl Into<String>,
        created_at: u64,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            user_id: user_id.into(),
            category: category.into(),
            status: ItemStatus::Available,
            created_at,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == ItemStatus::Available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_item_starts_available() {
        let item = Item::new("item-1", "user-1", "books", 100);
        assert!(item.is_available());
        assert_eq!(item.status, ItemStatus::Available);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&ItemStatus::Exchanged).unwrap();
        assert_eq!(json, "\"exchanged\"");
    }
}
