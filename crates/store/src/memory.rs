use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use swapmeet_types::{Bid, BidStatus, Item, User};

use crate::{BarterStore, Cursor, ItemFilter, StoreError, TxWrite};

// ═══════════════════════════════════════════════════════════════════════════
// CURSOR ENCODING
// ═══════════════════════════════════════════════════════════════════════════

/// Resume position for the item scan: the key of the last returned record.
/// Scan order is (created_at, item_id), so the pair is a total order.
#[derive(Debug, Serialize, Deserialize)]
struct ScanPosition {
    created_at: u64,
    item_id: String,
}

fn encode_cursor(position: &ScanPosition) -> Cursor {
    let bytes = serde_json::to_vec(position).expect("scan position serializes");
    Cursor::new(hex::encode(bytes))
}

fn decode_cursor(cursor: &Cursor) -> Result<ScanPosition, StoreError> {
    let bytes = hex::decode(cursor.as_str()).map_err(|_| StoreError::InvalidCursor)?;
    serde_json::from_slice(&bytes).map_err(|_| StoreError::InvalidCursor)
}

// ═══════════════════════════════════════════════════════════════════════════
// TABLES
// ═══════════════════════════════════════════════════════════════════════════

/// Primary tables plus the secondary indices a key-value backend would
/// maintain. All bid lookups go through an index; none walk the bid table.
#[derive(Debug, Default)]
struct Tables {
    users: HashMap<String, User>,
    items: HashMap<String, Item>,
    bids: HashMap<String, Bid>,

    /// phone_number -> user_id
    phone_index: HashMap<String, String>,
    /// owner user_id -> item ids
    owner_index: HashMap<String, BTreeSet<String>>,
    /// requested_user_id -> bid ids
    received_index: HashMap<String, BTreeSet<String>>,
    /// offered_by -> bid ids
    bidder_index: HashMap<String, BTreeSet<String>>,
    /// requested_item_id -> bid ids
    requested_item_index: HashMap<String, BTreeSet<String>>,
    /// offered_item_id -> bid ids
    offered_item_index: HashMap<String, BTreeSet<String>>,
}

impl Tables {
    fn index_bid(&mut self, bid: &Bid) {
        self.received_index
            .entry(bid.requested_user_id.clone())
            .or_default()
            .insert(bid.bid_id.clone());
        self.bidder_index
            .entry(bid.offered_by.clone())
            .or_default()
            .insert(bid.bid_id.clone());
        self.requested_item_index
            .entry(bid.requested_item_id.clone())
            .or_default()
            .insert(bid.bid_id.clone());
        self.offered_item_index
            .entry(bid.offered_item_id.clone())
            .or_default()
            .insert(bid.bid_id.clone());
    }

    fn unindex_bid(&mut self, bid: &Bid) {
        if let Some(set) = self.received_index.get_mut(&bid.requested_user_id) {
            set.remove(&bid.bid_id);
        }
        if let Some(set) = self.bidder_index.get_mut(&bid.offered_by) {
            set.remove(&bid.bid_id);
        }
        if let Some(set) = self.requested_item_index.get_mut(&bid.requested_item_id) {
            set.remove(&bid.bid_id);
        }
        if let Some(set) = self.offered_item_index.get_mut(&bid.offered_item_id) {
            set.remove(&bid.bid_id);
        }
    }

    fn bids_for_ids(&self, ids: &BTreeSet<String>) -> Vec<Bid> {
        ids.iter()
            .filter_map(|id| self.bids.get(id))
            .cloned()
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// IN-MEMORY STORE
// ═══════════════════════════════════════════════════════════════════════════

/// Reference store backed by a single lock over all tables, which makes
/// `transact` trivially all-or-nothing. Suitable for tests and demos.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `Unavailable` (for testing
    /// outage propagation).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated outage".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BarterStore for InMemoryStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().unwrap().users.get(user_id).cloned())
    }

    async fn put_user(&self, user: &User) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().unwrap();
        if let Some(previous) = tables.users.get(&user.user_id).cloned() {
            tables.phone_index.remove(&previous.phone_number);
        }
        tables
            .phone_index
            .insert(user.phone_number.clone(), user.user_id.clone());
        tables.users.insert(user.user_id.clone(), user.clone());
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().unwrap();
        if let Some(user) = tables.users.remove(user_id) {
            tables.phone_index.remove(&user.phone_number);
        }
        Ok(())
    }

    async fn find_user_by_phone(&self, phone_number: &str) -> Result<Option<User>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().unwrap();
        Ok(tables
            .phone_index
            .get(phone_number)
            .and_then(|user_id| tables.users.get(user_id))
            .cloned())
    }

    async fn get_item(&self, item_id: &str) -> Result<Option<Item>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().unwrap().items.get(item_id).cloned())
    }

    async fn put_item(&self, item: &Item) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().unwrap();
        if let Some(previous) = tables.items.get(&item.item_id).cloned() {
            if previous.user_id != item.user_id {
                if let Some(set) = tables.owner_index.get_mut(&previous.user_id) {
                    set.remove(&item.item_id);
                }
            }
        }
        tables
            .owner_index
            .entry(item.user_id.clone())
            .or_default()
            .insert(item.item_id.clone());
        tables.items.insert(item.item_id.clone(), item.clone());
        Ok(())
    }

    async fn delete_item(&self, item_id: &str) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().unwrap();
        if let Some(item) = tables.items.remove(item_id) {
            if let Some(set) = tables.owner_index.get_mut(&item.user_id) {
                set.remove(item_id);
            }
        }
        Ok(())
    }

    async fn items_by_user(&self, user_id: &str) -> Result<Vec<Item>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().unwrap();
        let ids = tables.owner_index.get(user_id).cloned().unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| tables.items.get(id))
            .cloned()
            .collect())
    }

    async fn scan_items(
        &self,
        filter: &ItemFilter,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> Result<(Vec<Item>, Option<Cursor>), StoreError> {
        self.check_available()?;
        let resume = cursor.map(decode_cursor).transpose()?;

        let tables = self.tables.read().unwrap();
        let mut ordered: Vec<&Item> = tables.items.values().collect();
        ordered.sort_by(|a, b| {
            (a.created_at, &a.item_id).cmp(&(b.created_at, &b.item_id))
        });

        let mut page = Vec::new();
        let mut next_cursor = None;
        for item in ordered {
            if let Some(position) = &resume {
                if (item.created_at, item.item_id.as_str())
                    <= (position.created_at, position.item_id.as_str())
                {
                    continue;
                }
            }
            if filter.matches(item) {
                page.push(item.clone());
            }
            if page.len() == limit {
                // Stopped before the end of the table; hand back the key of
                // the last examined record so the next page resumes after it.
                next_cursor = Some(encode_cursor(&ScanPosition {
                    created_at: item.created_at,
                    item_id: item.item_id.clone(),
                }));
                break;
            }
        }

        Ok((page, next_cursor))
    }

    async fn get_bid(&self, bid_id: &str) -> Result<Option<Bid>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().unwrap().bids.get(bid_id).cloned())
    }

    async fn put_bid(&self, bid: &Bid) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().unwrap();
        if let Some(previous) = tables.bids.get(&bid.bid_id).cloned() {
            tables.unindex_bid(&previous);
        }
        tables.index_bid(bid);
        tables.bids.insert(bid.bid_id.clone(), bid.clone());
        Ok(())
    }

    async fn delete_bid(&self, bid_id: &str) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().unwrap();
        if let Some(bid) = tables.bids.remove(bid_id) {
            tables.unindex_bid(&bid);
        }
        Ok(())
    }

    async fn bids_received_by(
        &self,
        user_id: &str,
        status: Option<BidStatus>,
    ) -> Result<Vec<Bid>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().unwrap();
        let ids = tables
            .received_index
            .get(user_id)
            .cloned()
            .unwrap_or_default();
        let mut bids = tables.bids_for_ids(&ids);
        if let Some(status) = status {
            bids.retain(|bid| bid.status == status);
        }
        Ok(bids)
    }

    async fn bids_offered_by(&self, user_id: &str) -> Result<Vec<Bid>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().unwrap();
        let ids = tables.bidder_index.get(user_id).cloned().unwrap_or_default();
        Ok(tables.bids_for_ids(&ids))
    }

    async fn bids_touching_item(&self, item_id: &str) -> Result<Vec<Bid>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().unwrap();
        // Union of the two item indices, deduplicated by bid_id.
        let mut ids = tables
            .requested_item_index
            .get(item_id)
            .cloned()
            .unwrap_or_default();
        if let Some(offered) = tables.offered_item_index.get(item_id) {
            ids.extend(offered.iter().cloned());
        }
        Ok(tables.bids_for_ids(&ids))
    }

    async fn transact(&self, writes: Vec<TxWrite>) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().unwrap();

        // Validate every guard before touching anything.
        for write in &writes {
            match write {
                TxWrite::ItemStatus {
                    item_id, expect, ..
                } => {
                    let item = tables.items.get(item_id).ok_or_else(|| StoreError::NotFound {
                        entity: "item",
                        key: item_id.clone(),
                    })?;
                    if item.status != *expect {
                        return Err(StoreError::ConditionFailed {
                            entity: "item",
                            key: item_id.clone(),
                        });
                    }
                }
                TxWrite::BidStatus { bid_id, guard, .. } => {
                    let bid = tables.bids.get(bid_id).ok_or_else(|| StoreError::NotFound {
                        entity: "bid",
                        key: bid_id.clone(),
                    })?;
                    if !guard.holds(bid.status) {
                        return Err(StoreError::ConditionFailed {
                            entity: "bid",
                            key: bid_id.clone(),
                        });
                    }
                }
            }
        }

        for write in writes {
            match write {
                TxWrite::ItemStatus { item_id, set, .. } => {
                    if let Some(item) = tables.items.get_mut(&item_id) {
                        item.status = set;
                    }
                }
                TxWrite::BidStatus { bid_id, set, .. } => {
                    if let Some(bid) = tables.bids.get_mut(&bid_id) {
                        bid.status = set;
                    }
                }
            }
        }

        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════
