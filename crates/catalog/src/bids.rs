use serde::{Deserialize, Serialize};
use std::sync::Arc;
use swapmeet_store::BarterStore;
use swapmeet_types::{Bid, BidStatus, ExchangeError};
use tracing::info;
use uuid::Uuid;

use crate::now_unix;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBid {
    /// Generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_id: Option<String>,

    pub offered_by: String,
    pub offered_item_id: String,
    pub requested_item_id: String,
}

/// Bid record operations.
///
/// Placement validates ownership on both sides: the bidder must own the
/// offered item, the requested item must belong to someone else, and both
/// items must still be available. The requested user is derived from the
/// requested item's owner rather than trusted from the caller.
pub struct BidRegistry<S: BarterStore> {
    store: Arc<S>,
}

impl<S: BarterStore> BidRegistry<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn place(&self, new_bid: NewBid) -> Result<Bid, ExchangeError> {
        if new_bid.offered_by.is_empty() {
            return Err(ExchangeError::invalid_argument("offered_by is required"));
        }
        if new_bid.offered_item_id.is_empty() || new_bid.requested_item_id.is_empty() {
            return Err(ExchangeError::invalid_argument(
                "offered_item_id and requested_item_id are required",
            ));
        }
        if new_bid.offered_item_id == new_bid.requested_item_id {
            return Err(ExchangeError::invalid_argument(
                "cannot exchange an item for itself",
            ));
        }

        let offered = self
            .store
            .get_item(&new_bid.offered_item_id)
            .await?
            .ok_or_else(|| {
                ExchangeError::not_found(format!("item {}", new_bid.offered_item_id))
            })?;
        let requested = self
            .store
            .get_item(&new_bid.requested_item_id)
            .await?
            .ok_or_else(|| {
                ExchangeError::not_found(format!("item {}", new_bid.requested_item_id))
            })?;

        if offered.user_id != new_bid.offered_by {
            return Err(ExchangeError::invalid_argument(format!(
                "item {} is not owned by {}",
                offered.item_id, new_bid.offered_by
            )));
        }
        if requested.user_id == new_bid.offered_by {
            return Err(ExchangeError::invalid_argument(
                "cannot bid on your own item",
            ));
        }
        if !offered.is_available() || !requested.is_available() {
            return Err(ExchangeError::invalid_state(
                "both items must be available".to_string(),
            ));
        }

        let bid = Bid {
            bid_id: new_bid
                .bid_id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            offered_by: new_bid.offered_by,
            offered_item_id: new_bid.offered_item_id,
            requested_user_id: requested.user_id,
            requested_item_id: new_bid.requested_item_id,
            status: BidStatus::Pending,
            created_at: now_unix(),
        };

        self.store.put_bid(&bid).await?;
        info!(
            bid_id = %bid.bid_id,
            offered_by = %bid.offered_by,
            requested_item = %bid.requested_item_id,
            "bid placed"
        );
        Ok(bid)
    }

    pub async fn get(&self, bid_id: &str) -> Result<Bid, ExchangeError> {
        self.store
            .get_bid(bid_id)
            .await?
            .ok_or_else(|| ExchangeError::not_found(format!("bid {bid_id}")))
    }

    /// Bids requesting one of `user_id`'s items, optionally narrowed by
    /// status.
    pub async fn received(
        &self,
        user_id: &str,
        status: Option<BidStatus>,
    ) -> Result<Vec<Bid>, ExchangeError> {
        if user_id.is_empty() {
            return Err(ExchangeError::invalid_argument("user_id is required"));
        }
        Ok(self.store.bids_received_by(user_id, status).await?)
    }

    /// Bids placed by `user_id`.
    pub async fn offered(&self, user_id: &str) -> Result<Vec<Bid>, ExchangeError> {
        if user_id.is_empty() {
            return Err(ExchangeError::invalid_argument("user_id is required"));
        }
        Ok(self.store.bids_offered_by(user_id).await?)
    }

    /// Delete a bid record. Accepted bids are part of a settled exchange and
    /// stay on the books.
    pub async fn delete(&self, bid_id: &str) -> Result<(), ExchangeError> {
        let bid = self.get(bid_id).await?;
        if bid.status == BidStatus::Accepted {
            return Err(ExchangeError::invalid_state(format!(
                "bid {bid_id} was accepted and cannot be deleted"
            )));
        }
        self.store.delete_bid(bid_id).await?;
        info!(bid_id, "bid deleted");
        Ok(())
    }
}
