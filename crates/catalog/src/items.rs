use serde::{Deserialize, Serialize};
use std::sync::Arc;
use swapmeet_store::BarterStore;
use swapmeet_types::{ExchangeError, Item};
use tracing::info;
use uuid::Uuid;

use crate::now_unix;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewItem {
    /// Generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,

    pub user_id: String,

    #[serde(default)]
    pub category: String,
}

/// Single-record item operations. Status transitions are settlement's job;
/// the catalog only ever creates items as available and edits metadata.
pub struct ItemCatalog<S: BarterStore> {
    store: Arc<S>,
}

impl<S: BarterStore> ItemCatalog<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn create(&self, new_item: NewItem) -> Result<Item, ExchangeError> {
        if new_item.user_id.is_empty() {
            return Err(ExchangeError::invalid_argument("user_id is required"));
        }
        let item_id = new_item
            .item_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let item = Item::new(item_id, new_item.user_id, new_item.category, now_unix());
        self.store.put_item(&item).await?;
        info!(item_id = %item.item_id, user_id = %item.user_id, "item created");
        Ok(item)
    }

    pub async fn get(&self, item_id: &str) -> Result<Item, ExchangeError> {
        self.store
            .get_item(item_id)
            .await?
            .ok_or_else(|| ExchangeError::not_found(format!("item {item_id}")))
    }

    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Item>, ExchangeError> {
        if user_id.is_empty() {
            return Err(ExchangeError::invalid_argument("user_id is required"));
        }
        Ok(self.store.items_by_user(user_id).await?)
    }

    pub async fn update_category(
        &self,
        item_id: &str,
        category: &str,
    ) -> Result<Item, ExchangeError> {
        let mut item = self.get(item_id).await?;
        item.category = category.to_string();
        self.store.put_item(&item).await?;
        Ok(item)
    }

    /// Delete an item, refusing while any live bid still references it.
    pub async fn delete(&self, item_id: &str) -> Result<(), ExchangeError> {
        let _ = self.get(item_id).await?;

        let live = self
            .store
            .bids_touching_item(item_id)
            .await?
            .into_iter()
            .find(|bid| bid.status.is_live());
        if let Some(bid) = live {
            return Err(ExchangeError::invalid_state(format!(
                "item {item_id} is referenced by live bid {}",
                bid.bid_id
            )));
        }

        self.store.delete_item(item_id).await?;
        info!(item_id, "item deleted");
        Ok(())
    }
}
