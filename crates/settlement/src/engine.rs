use std::collections::BTreeMap;
use std::sync::Arc;
use swapmeet_store::{BarterStore, BidGuard, TxWrite};
use swapmeet_types::{Bid, BidStatus, ExchangeError, ItemStatus};
use tracing::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
// SETTLEMENT ENGINE
// ═══════════════════════════════════════════════════════════════════════════

/// Accepts bids and drives both involved items plus all competing bids into
/// their terminal states as one atomic unit.
///
/// The engine never locks anything itself; the store's conditional
/// transaction is the sole arbiter between concurrent settlements on
/// overlapping items. The loser of such a race sees `InvalidState`.
pub struct SettlementEngine<S: BarterStore> {
    store: Arc<S>,
}

impl<S: BarterStore> SettlementEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Accept the given pending bid.
    ///
    /// On success both items are `Exchanged`, the bid is `Accepted`, and
    /// every other bid touching either item is `Rejected`. No reader can
    /// observe a state in between: all transitions commit in a single
    /// guarded transaction, keyed on each record's expected prior status.
    pub async fn settle(&self, bid_id: &str) -> Result<(), ExchangeError> {
        if bid_id.is_empty() {
            return Err(ExchangeError::invalid_argument("bid_id is required"));
        }

        let bid = self
            .store
            .get_bid(bid_id)
            .await?
            .ok_or_else(|| ExchangeError::not_found(format!("bid {bid_id}")))?;

        if bid.status != BidStatus::Pending {
            return Err(ExchangeError::invalid_state(format!(
                "bid {bid_id} is already {:?}",
                bid.status
            )));
        }

        let competitors = self.competing_bids(&bid).await?;

        // Another accepted bid on either item means the exchange already
        // happened; never overwrite it.
        if let Some(winner) = competitors
            .values()
            .find(|other| other.status == BidStatus::Accepted)
        {
            warn!(
                bid_id,
                accepted_bid = %winner.bid_id,
                "settlement refused: item already exchanged under another bid"
            );
            return Err(ExchangeError::invalid_state(format!(
                "bid {} was already accepted for an overlapping item",
                winner.bid_id
            )));
        }

        let mut writes = vec![
            TxWrite::item_status(
                bid.requested_item_id.clone(),
                ItemStatus::Available,
                ItemStatus::Exchanged,
            ),
            TxWrite::item_status(
                bid.offered_item_id.clone(),
                ItemStatus::Available,
                ItemStatus::Exchanged,
            ),
            TxWrite::bid_status(bid_id, BidGuard::Is(BidStatus::Pending), BidStatus::Accepted),
        ];

        // Already-rejected competitors are skipped (re-rejecting is a
        // no-op); the IsNot(Accepted) guard keeps a racing winner safe.
        for other in competitors.values() {
            if other.status == BidStatus::Pending {
                writes.push(TxWrite::bid_status(
                    other.bid_id.clone(),
                    BidGuard::IsNot(BidStatus::Accepted),
                    BidStatus::Rejected,
                ));
            }
        }

        let rejected = writes.len() - 3;
        self.store.transact(writes).await?;

        info!(
            bid_id,
            requested_item = %bid.requested_item_id,
            offered_item = %bid.offered_item_id,
            rejected_competitors = rejected,
            "bid settled"
        );
        Ok(())
    }

    /// Reject a pending bid directly, without settling anything.
    ///
    /// This is the item owner's side of the protocol; settlement rejects
    /// competitors on its own.
    pub async fn reject(&self, bid_id: &str) -> Result<(), ExchangeError> {
        if bid_id.is_empty() {
            return Err(ExchangeError::invalid_argument("bid_id is required"));
        }

        let bid = self
            .store
            .get_bid(bid_id)
            .await?
            .ok_or_else(|| ExchangeError::not_found(format!("bid {bid_id}")))?;

        if bid.status != BidStatus::Pending {
            return Err(ExchangeError::invalid_state(format!(
                "bid {bid_id} is already {:?}",
                bid.status
            )));
        }

        self.store
            .transact(vec![TxWrite::bid_status(
                bid_id,
                BidGuard::Is(BidStatus::Pending),
                BidStatus::Rejected,
            )])
            .await?;

        info!(bid_id, "bid rejected by owner");
        Ok(())
    }

    /// Every bid touching either involved item, except the settling bid
    /// itself, unioned by bid_id from the two item indices.
    async fn competing_bids(&self, bid: &Bid) -> Result<BTreeMap<String, Bid>, ExchangeError> {
        let mut competitors = BTreeMap::new();
        for item_id in [&bid.requested_item_id, &bid.offered_item_id] {
            for other in self.store.bids_touching_item(item_id).await? {
                if other.bid_id != bid.bid_id {
                    competitors.insert(other.bid_id.clone(), other);
                }
            }
        }
        Ok(competitors)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════
