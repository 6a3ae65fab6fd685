use serde::{Deserialize, Serialize};

/// Lifecycle state of a bid.
///
/// `Accepted` and `Rejected` are terminal; a bid is "live" while it is
/// pending or accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
}

impl BidStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BidStatus::Accepted | BidStatus::Rejected)
    }

    /// A live bid blocks the items it references from other exchanges.
    pub fn is_live(&self) -> bool {
        matches!(self, BidStatus::Pending | BidStatus::Accepted)
    }
}

/// A proposal to exchange the bidder's item for another user's item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    /// Unique identifier
    pub bid_id: String,

    /// Bidder's user id
    pub offered_by: String,

    /// The bidder's own item, put up in exchange
    pub offered_item_id: String,

    /// Owner of the desired item
    pub requested_user_id: String,

    /// The item the bidder wants
    pub requested_item_id: String,

    pub status: BidStatus,

    /// Unix timestamp (seconds)
    pub created_at: u64,
}

impl Bid {
    /// Whether this bid references the given item on either side.
    pub fn touches(&self, item_id: &str) -> bool {
        self.offered_item_id == item_id || self.requested_item_id == item_id
    }
}
