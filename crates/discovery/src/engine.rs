use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use swapmeet_store::{BarterStore, Cursor, ItemFilter};
use swapmeet_types::{BidStatus, ExchangeError, Item, ItemStatus};
use tracing::debug;

// ═══════════════════════════════════════════════════════════════════════════
// CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Items fetched per store page when the request does not override it
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    1
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// REQUEST / RESPONSE
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoverRequest {
    pub user_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Continuation token from a prior page, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,

    /// Overrides the configured page size when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
}

/// One page of candidate items.
///
/// An empty `items` with `cursor` present is a valid page: the exclusion
/// filter may have removed everything the store returned. Callers keep
/// paging until `cursor` is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverPage {
    pub items: Vec<Item>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
}

// ═══════════════════════════════════════════════════════════════════════════
// DISCOVERY ENGINE
// ═══════════════════════════════════════════════════════════════════════════

/// Surfaces items a user could bid on: available, owned by someone else,
/// optionally category-filtered, minus items the user already has a live bid
/// against.
pub struct DiscoveryEngine<S: BarterStore> {
    store: Arc<S>,
    config: DiscoveryConfig,
}

impl<S: BarterStore> DiscoveryEngine<S> {
    pub fn new(store: Arc<S>, config: DiscoveryConfig) -> Self {
        Self { store, config }
    }

    pub async fn discover(&self, request: DiscoverRequest) -> Result<DiscoverPage, ExchangeError> {
        if request.user_id.is_empty() {
            return Err(ExchangeError::invalid_argument("user_id is required"));
        }
        let page_size = request.page_size.unwrap_or(self.config.page_size);
        if page_size == 0 {
            return Err(ExchangeError::invalid_argument("page_size must be positive"));
        }

        let filter = ItemFilter {
            exclude_user: Some(request.user_id.clone()),
            status: Some(ItemStatus::Available),
            category: request.category.clone(),
        };

        let (scanned, next_cursor) = self
            .store
            .scan_items(&filter, request.cursor.as_ref(), page_size)
            .await?;

        // Recomputed per page: the set of items this user is already
        // committed to obtaining through a live bid. Stale reads here are
        // tolerated; settlement's writes are not affected.
        let excluded = self.committed_item_ids(&request.user_id).await?;

        let before = scanned.len();
        let items: Vec<Item> = scanned
            .into_iter()
            .filter(|item| !excluded.contains(&item.item_id))
            .collect();

        debug!(
            user_id = %request.user_id,
            fetched = before,
            returned = items.len(),
            has_more = next_cursor.is_some(),
            "discovery page served"
        );

        Ok(DiscoverPage {
            items,
            cursor: next_cursor,
        })
    }

    /// Offered item ids of this user's live inbound bids, unioned from one
    /// index query per live status.
    async fn committed_item_ids(&self, user_id: &str) -> Result<HashSet<String>, ExchangeError> {
        let mut ids = HashSet::new();
        for status in [BidStatus::Pending, BidStatus::Accepted] {
            for bid in self.store.bids_received_by(user_id, Some(status)).await? {
                ids.insert(bid.offered_item_id);
            }
        }
        Ok(ids)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════
