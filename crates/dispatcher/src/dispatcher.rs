use std::sync::Arc;
use swapmeet_catalog::{BidRegistry, ItemCatalog, UserDirectory};
use swapmeet_config::AppConfig;
use swapmeet_discovery::{DiscoveryConfig, DiscoveryEngine};
use swapmeet_settlement::SettlementEngine;
use swapmeet_store::BarterStore;
use swapmeet_types::ExchangeError;
use tracing::debug;

use crate::{Request, Response};

/// Maps verbs onto the engines and record services.
///
/// Owns no state beyond the injected store handle; every call is an
/// independent request-scoped unit. Transports (HTTP, queue consumers,
/// test drivers) sit above this and only translate framing.
pub struct Dispatcher<S: BarterStore> {
    settlement: SettlementEngine<S>,
    discovery: DiscoveryEngine<S>,
    items: ItemCatalog<S>,
    bids: BidRegistry<S>,
    users: UserDirectory<S>,
}

impl<S: BarterStore> Dispatcher<S> {
    pub fn new(store: Arc<S>, config: &AppConfig) -> Self {
        let discovery_config = DiscoveryConfig {
            page_size: config.discovery.page_size,
        };
        Self {
            settlement: SettlementEngine::new(store.clone()),
            discovery: DiscoveryEngine::new(store.clone(), discovery_config),
            items: ItemCatalog::new(store.clone()),
            bids: BidRegistry::new(store.clone()),
            users: UserDirectory::new(store),
        }
    }

    pub async fn dispatch(&self, request: Request) -> Response {
        debug!(?request, "dispatching");
        match request {
            Request::Settle(params) => unit(self.settlement.settle(&params.bid_id).await),
            Request::RejectBid(params) => unit(self.settlement.reject(&params.bid_id).await),
            Request::Discover(params) => respond(self.discovery.discover(params).await),

            Request::CreateItem(params) => respond(self.items.create(params).await),
            Request::GetItem(params) => respond(self.items.get(&params.item_id).await),
            Request::ListItems(params) => respond(self.items.list_by_user(&params.user_id).await),
            Request::UpdateItem(params) => {
                respond(self.items.update_category(&params.item_id, &params.category).await)
            }
            Request::DeleteItem(params) => unit(self.items.delete(&params.item_id).await),

            Request::PlaceBid(params) => respond(self.bids.place(params).await),
            Request::GetBid(params) => respond(self.bids.get(&params.bid_id).await),
            Request::ReceivedBids(params) => {
                respond(self.bids.received(&params.user_id, params.status).await)
            }
            Request::OfferedBids(params) => respond(self.bids.offered(&params.user_id).await),
            Request::DeleteBid(params) => unit(self.bids.delete(&params.bid_id).await),

            Request::CreateUser(params) => respond(self.users.create(params).await),
            Request::GetUser(params) => respond(self.users.get(&params.user_id).await),
            Request::FindUserByPhone(params) => {
                respond(self.users.find_by_phone(&params.phone_number).await)
            }
            Request::UpdateUser(params) => {
                respond(self.users.update_phone(&params.user_id, &params.phone_number).await)
            }
            Request::DeleteUser(params) => unit(self.users.delete(&params.user_id).await),
        }
    }
}

fn respond<T: serde::Serialize>(result: Result<T, ExchangeError>) -> Response {
    match result {
        Ok(body) => Response::ok(body),
        Err(err) => Response::error(&err),
    }
}

fn unit(result: Result<(), ExchangeError>) -> Response {
    match result {
        Ok(()) => Response::ok(serde_json::json!({ "ok": true })),
        Err(err) => Response::error(&err),
    }
}
