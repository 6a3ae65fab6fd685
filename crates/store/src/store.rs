use async_trait::async_trait;
use swapmeet_types::{Bid, BidStatus, ExchangeError, Item, ItemStatus, User};
use thiserror::Error;

use crate::Cursor;

// ═══════════════════════════════════════════════════════════════════════════
// ERROR TYPES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record not found: {entity} {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("condition failed: {entity} {key}")]
    ConditionFailed { entity: &'static str, key: String },

    #[error("invalid cursor token")]
    InvalidCursor,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for ExchangeError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, key } => {
                ExchangeError::NotFound(format!("{entity} {key}"))
            }
            StoreError::ConditionFailed { entity, key } => {
                ExchangeError::InvalidState(format!("conflicting update on {entity} {key}"))
            }
            StoreError::InvalidCursor => ExchangeError::InvalidCursor,
            StoreError::Unavailable(msg) => ExchangeError::StoreUnavailable(msg),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SCAN FILTER
// ═══════════════════════════════════════════════════════════════════════════

/// Predicate applied by the store during an item scan, before pagination
/// limits are counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    /// Skip items owned by this user
    pub exclude_user: Option<String>,

    /// Only items in this status
    pub status: Option<ItemStatus>,

    /// Only items with this category tag
    pub category: Option<String>,
}

impl ItemFilter {
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(user) = &self.exclude_user {
            if &item.user_id == user {
                return false;
            }
        }
        if let Some(status) = self.status {
            if item.status != status {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &item.category != category {
                return false;
            }
        }
        true
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CONDITIONAL TRANSACTION
// ═══════════════════════════════════════════════════════════════════════════

/// Guard on a bid's prior status within a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BidGuard {
    /// The bid must currently have exactly this status.
    Is(BidStatus),
    /// The bid may be in any status except this one.
    IsNot(BidStatus),
}

impl BidGuard {
    pub fn holds(&self, status: BidStatus) -> bool {
        match self {
            BidGuard::Is(expected) => status == *expected,
            BidGuard::IsNot(forbidden) => status != *forbidden,
        }
    }
}

/// One guarded status write inside a conditional transaction.
///
/// Settlement commits every transition of an exchange as a single
/// `Vec<TxWrite>`: if any guard fails, none of the writes apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxWrite {
    ItemStatus {
        item_id: String,
        expect: ItemStatus,
        set: ItemStatus,
    },
    BidStatus {
        bid_id: String,
        guard: BidGuard,
        set: BidStatus,
    },
}

impl TxWrite {
    pub fn item_status(item_id: impl Into<String>, expect: ItemStatus, set: ItemStatus) -> Self {
        TxWrite::ItemStatus {
            item_id: item_id.into(),
            expect,
            set,
        }
    }

    pub fn bid_status(bid_id: impl Into<String>, guard: BidGuard, set: BidStatus) -> Self {
        TxWrite::BidStatus {
            bid_id: bid_id.into(),
            guard,
            set,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// STORE TRAIT
// ═══════════════════════════════════════════════════════════════════════════

/// Marketplace storage interface, the only shared resource in the system.
///
/// Secondary-index queries mirror the indices a key-value backend would
/// maintain: items by owner, bids by requested user, bids by bidder, bids by
/// either referenced item, and users by phone number. `transact` is the
/// all-or-nothing conditional write used exclusively by settlement.
#[async_trait]
pub trait BarterStore: Send + Sync {
    // --- users ---

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    async fn put_user(&self, user: &User) -> Result<(), StoreError>;

    async fn delete_user(&self, user_id: &str) -> Result<(), StoreError>;

    /// Lookup through the phone-number index.
    async fn find_user_by_phone(&self, phone_number: &str) -> Result<Option<User>, StoreError>;

    // --- items ---

    async fn get_item(&self, item_id: &str) -> Result<Option<Item>, StoreError>;

    async fn put_item(&self, item: &Item) -> Result<(), StoreError>;

    async fn delete_item(&self, item_id: &str) -> Result<(), StoreError>;

    /// Items owned by a user, through the owner index.
    async fn items_by_user(&self, user_id: &str) -> Result<Vec<Item>, StoreError>;

    /// Filtered scan over items with pagination.
    ///
    /// Returns at most `limit` matching items in stable scan order, plus a
    /// continuation cursor when the scan stopped before exhausting the
    /// table. The cursor is opaque to callers; passing a token this store
    /// did not issue yields `InvalidCursor`.
    async fn scan_items(
        &self,
        filter: &ItemFilter,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> Result<(Vec<Item>, Option<Cursor>), StoreError>;

    // --- bids ---

    async fn get_bid(&self, bid_id: &str) -> Result<Option<Bid>, StoreError>;

    async fn put_bid(&self, bid: &Bid) -> Result<(), StoreError>;

    async fn delete_bid(&self, bid_id: &str) -> Result<(), StoreError>;

    /// Bids requesting one of `user_id`'s items, optionally narrowed to one
    /// status, through the requested-user index.
    async fn bids_received_by(
        &self,
        user_id: &str,
        status: Option<BidStatus>,
    ) -> Result<Vec<Bid>, StoreError>;

    /// Bids placed by `user_id`, through the bidder index.
    async fn bids_offered_by(&self, user_id: &str) -> Result<Vec<Bid>, StoreError>;

    /// Every bid referencing `item_id` as its requested or offered item,
    /// unioned from the two item indices. Cost is proportional to matching
    /// bids, not table size.
    async fn bids_touching_item(&self, item_id: &str) -> Result<Vec<Bid>, StoreError>;

    /// Apply every guarded write or none of them.
    ///
    /// A missing record fails with `NotFound`, a failed guard with
    /// `ConditionFailed`; in both cases no write in the batch applies.
    async fn transact(&self, writes: Vec<TxWrite>) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matches_all_clauses() {
        let item = Item::new("item-1", "user-1", "books", 100);

        assert!(ItemFilter::default().matches(&item));

        let filter = ItemFilter {
            exclude_user: Some("user-1".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&item));

        let filter = ItemFilter {
            status: Some(ItemStatus::Exchanged),
            ..Default::default()
        };
        assert!(!filter.matches(&item));

        let filter = ItemFilter {
            category: Some("books".to_string()),
            status: Some(ItemStatus::Available),
            exclude_user: Some("user-2".to_string()),
        };
        assert!(filter.matches(&item));
    }

    #[test]
    fn bid_guard_holds() {
        assert!(BidGuard::Is(BidStatus::Pending).holds(BidStatus::Pending));
        assert!(!BidGuard::Is(BidStatus::Pending).holds(BidStatus::Rejected));
        assert!(BidGuard::IsNot(BidStatus::Accepted).holds(BidStatus::Rejected));
        assert!(!BidGuard::IsNot(BidStatus::Accepted).holds(BidStatus::Accepted));
    }

    #[test]
    fn store_errors_map_to_exchange_errors() {
        let err: ExchangeError = StoreError::ConditionFailed {
            entity: "item",
            key: "item-1".to_string(),
        }
        .into();
        assert!(matches!(err, ExchangeError::InvalidState(_)));

        let err: ExchangeError = StoreError::InvalidCursor.into();
        assert_eq!(err, ExchangeError::InvalidCursor);

        let err: ExchangeError = StoreError::Unavailable("down".to_string()).into();
        assert!(matches!(err, ExchangeError::StoreUnavailable(_)));
    }
}
