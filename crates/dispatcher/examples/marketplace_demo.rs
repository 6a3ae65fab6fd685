/// Walks a full barter exchange through the typed request boundary:
/// two users list items, one bids, the owner accepts, and discovery
/// reflects the settled state.
use std::sync::Arc;
use swapmeet_catalog::{NewBid, NewItem, NewUser};
use swapmeet_config::AppConfig;
use swapmeet_discovery::DiscoverRequest;
use swapmeet_dispatcher::{init_tracing, Dispatcher, Request, SettleParams};
use swapmeet_store::InMemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::default();
    init_tracing(&config.logging.level);

    let store = Arc::new(InMemoryStore::new());
    let dispatcher = Dispatcher::new(store, &config);

    println!("=== Swapmeet Marketplace Demo ===\n");

    for (user_id, phone) in [("alice", "+15551111"), ("bob", "+15552222")] {
        dispatcher
            .dispatch(Request::CreateUser(NewUser {
                user_id: user_id.to_string(),
                phone_number: phone.to_string(),
            }))
            .await;
        println!("created user {user_id}");
    }

    for (item_id, user_id, category) in [
        ("guitar", "alice", "instruments"),
        ("camera", "bob", "electronics"),
    ] {
        dispatcher
            .dispatch(Request::CreateItem(NewItem {
                item_id: Some(item_id.to_string()),
                user_id: user_id.to_string(),
                category: category.to_string(),
            }))
            .await;
        println!("{user_id} listed {item_id}");
    }

    // Bob wants the guitar and offers his camera.
    let placed = dispatcher
        .dispatch(Request::PlaceBid(NewBid {
            bid_id: None,
            offered_by: "bob".to_string(),
            offered_item_id: "camera".to_string(),
            requested_item_id: "guitar".to_string(),
        }))
        .await;
    let bid_id = placed.body["bid_id"]
        .as_str()
        .expect("bid id in response")
        .to_string();
    println!("bob placed bid {bid_id}");

    // Alice accepts; both items settle atomically.
    let settled = dispatcher
        .dispatch(Request::Settle(SettleParams {
            bid_id: bid_id.clone(),
        }))
        .await;
    println!("settle status: {}", settled.status);

    // A second settle attempt must fail cleanly.
    let again = dispatcher
        .dispatch(Request::Settle(SettleParams { bid_id }))
        .await;
    println!("second settle status: {} ({})", again.status, again.body["error"]);

    // Nothing is left to discover: both items are exchanged.
    let page = dispatcher
        .dispatch(Request::Discover(DiscoverRequest {
            user_id: "alice".to_string(),
            ..Default::default()
        }))
        .await;
    println!("discovery for alice: {}", page.body["items"]);

    Ok(())
}
