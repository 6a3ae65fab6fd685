use std::collections::BTreeMap;
use std::sync::Arc;
use swapmeet_catalog::{BidRegistry, ItemCatalog, NewBid, NewItem, NewUser, UserDirectory};
use swapmeet_config::AppConfig;
use swapmeet_discovery::{DiscoverRequest, DiscoveryConfig, DiscoveryEngine};
use swapmeet_dispatcher::{Dispatcher, Request, SettleParams};
use swapmeet_settlement::SettlementEngine;
use swapmeet_store::{BarterStore, InMemoryStore};
use swapmeet_types::{BidStatus, ExchangeError, ItemStatus};

// ═══════════════════════════════════════════════════════════════════════════
// FIXTURES
// ═══════════════════════════════════════════════════════════════════════════

struct Marketplace {
    store: Arc<InMemoryStore>,
    users: UserDirectory<InMemoryStore>,
    items: ItemCatalog<InMemoryStore>,
    bids: BidRegistry<InMemoryStore>,
    settlement: SettlementEngine<InMemoryStore>,
}

impl Marketplace {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: UserDirectory::new(store.clone()),
            items: ItemCatalog::new(store.clone()),
            bids: BidRegistry::new(store.clone()),
            settlement: SettlementEngine::new(store.clone()),
            store,
        }
    }

    fn discovery(&self, page_size: usize) -> DiscoveryEngine<InMemoryStore> {
        DiscoveryEngine::new(self.store.clone(), DiscoveryConfig { page_size })
    }

    async fn add_user(&self, user_id: &str) {
        self.users
            .create(NewUser {
                user_id: user_id.to_string(),
                phone_number: format!("+1555{user_id}"),
            })
            .await
            .unwrap();
    }

    async fn add_item(&self, item_id: &str, user_id: &str, category: &str) {
        self.items
            .create(NewItem {
                item_id: Some(item_id.to_string()),
                user_id: user_id.to_string(),
                category: category.to_string(),
            })
            .await
            .unwrap();
    }

    async fn add_bid(&self, bid_id: &str, offered_by: &str, offered: &str, requested: &str) {
        self.bids
            .place(NewBid {
                bid_id: Some(bid_id.to_string()),
                offered_by: offered_by.to_string(),
                offered_item_id: offered.to_string(),
                requested_item_id: requested.to_string(),
            })
            .await
            .unwrap();
    }

    async fn item_status(&self, item_id: &str) -> ItemStatus {
        self.store.get_item(item_id).await.unwrap().unwrap().status
    }

    async fn bid_status(&self, bid_id: &str) -> BidStatus {
        self.store.get_bid(bid_id).await.unwrap().unwrap().status
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SETTLEMENT PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════

/// The worked example: U1 owns I1, U2 owns I2, B1 exchanges them, and a
/// competing B2 requesting I1 ends up rejected.
#[tokio::test]
async fn settlement_drives_everything_into_terminal_state() {
    let market = Marketplace::new();
    for user in ["u1", "u2", "u3"] {
        market.add_user(user).await;
    }
    market.add_item("i1", "u1", "books").await;
    market.add_item("i2", "u2", "books").await;
    market.add_item("i3", "u3", "books").await;
    market.add_bid("b1", "u2", "i2", "i1").await;
    market.add_bid("b2", "u3", "i3", "i1").await;

    market.settlement.settle("b1").await.unwrap();

    assert_eq!(market.item_status("i1").await, ItemStatus::Exchanged);
    assert_eq!(market.item_status("i2").await, ItemStatus::Exchanged);
    assert_eq!(market.bid_status("b1").await, BidStatus::Accepted);
    assert_eq!(market.bid_status("b2").await, BidStatus::Rejected);

    // Exactly one bid touching either item is accepted. A bid referencing
    // both items shows up under each, so union by id before counting.
    let mut touching = BTreeMap::new();
    for item in ["i1", "i2"] {
        for bid in market.store.bids_touching_item(item).await.unwrap() {
            assert!(bid.status.is_terminal(), "bid {} left live", bid.bid_id);
            touching.insert(bid.bid_id.clone(), bid);
        }
    }
    let accepted = touching
        .values()
        .filter(|bid| bid.status == BidStatus::Accepted)
        .count();
    assert_eq!(accepted, 1);

    // The loser's offered item was never part of the exchange.
    assert_eq!(market.item_status("i3").await, ItemStatus::Available);

    // Discovery no longer surfaces the exchanged items to anyone.
    let page = market
        .discovery(10)
        .discover(DiscoverRequest {
            user_id: "u2".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let ids: Vec<_> = page.items.iter().map(|i| i.item_id.as_str()).collect();
    assert_eq!(ids, vec!["i3"]);
}

#[tokio::test]
async fn settling_twice_is_rejected_and_state_is_stable() {
    let market = Marketplace::new();
    for user in ["u1", "u2"] {
        market.add_user(user).await;
    }
    market.add_item("i1", "u1", "books").await;
    market.add_item("i2", "u2", "books").await;
    market.add_bid("b1", "u2", "i2", "i1").await;

    market.settlement.settle("b1").await.unwrap();
    let err = market.settlement.settle("b1").await.unwrap_err();
    assert!(matches!(err, ExchangeError::InvalidState(_)));

    assert_eq!(market.item_status("i1").await, ItemStatus::Exchanged);
    assert_eq!(market.item_status("i2").await, ItemStatus::Exchanged);
    assert_eq!(market.bid_status("b1").await, BidStatus::Accepted);
}

/// Two settlements race on bids sharing a requested item: exactly one wins
/// and each item is exchanged exactly once.
#[tokio::test]
async fn concurrent_settlements_on_overlapping_items_have_one_winner() {
    let market = Marketplace::new();
    for user in ["u1", "u2", "u3"] {
        market.add_user(user).await;
    }
    market.add_item("i1", "u1", "books").await;
    market.add_item("i2", "u2", "books").await;
    market.add_item("i3", "u3", "books").await;
    market.add_bid("b1", "u2", "i2", "i1").await;
    market.add_bid("b2", "u3", "i3", "i1").await;

    let engine_a = SettlementEngine::new(market.store.clone());
    let engine_b = SettlementEngine::new(market.store.clone());
    let (result_a, result_b) = tokio::join!(
        tokio::spawn(async move { engine_a.settle("b1").await }),
        tokio::spawn(async move { engine_b.settle("b2").await }),
    );
    let results = [result_a.unwrap(), result_b.unwrap()];

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one settlement must win: {results:?}");
    let loser = results
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("one settlement must lose");
    assert!(matches!(loser, ExchangeError::InvalidState(_)));

    // The shared item is exchanged exactly once; the loser's offered item
    // depends on who won but is never half-settled.
    assert_eq!(market.item_status("i1").await, ItemStatus::Exchanged);
    let accepted: Vec<_> = market
        .store
        .bids_touching_item("i1")
        .await
        .unwrap()
        .into_iter()
        .filter(|b| b.status == BidStatus::Accepted)
        .collect();
    assert_eq!(accepted.len(), 1);

    let (winner_offered, loser_offered) = if accepted[0].bid_id == "b1" {
        ("i2", "i3")
    } else {
        ("i3", "i2")
    };
    assert_eq!(market.item_status(winner_offered).await, ItemStatus::Exchanged);
    assert_eq!(market.item_status(loser_offered).await, ItemStatus::Available);
}

#[tokio::test]
async fn outage_mid_settlement_leaves_no_partial_state() {
    let market = Marketplace::new();
    for user in ["u1", "u2"] {
        market.add_user(user).await;
    }
    market.add_item("i1", "u1", "books").await;
    market.add_item("i2", "u2", "books").await;
    market.add_bid("b1", "u2", "i2", "i1").await;

    market.store.set_unavailable(true);
    let err = market.settlement.settle("b1").await.unwrap_err();
    assert!(matches!(err, ExchangeError::StoreUnavailable(_)));

    market.store.set_unavailable(false);
    assert_eq!(market.item_status("i1").await, ItemStatus::Available);
    assert_eq!(market.item_status("i2").await, ItemStatus::Available);
    assert_eq!(market.bid_status("b1").await, BidStatus::Pending);

    // The failed attempt changed nothing, so settling again succeeds.
    market.settlement.settle("b1").await.unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════
// DISCOVERY PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════

/// Walking every page yields exactly the complement of the exclusion set,
/// without duplicates, even at page size 1.
#[tokio::test]
async fn full_cursor_walk_covers_the_candidate_set() {
    let market = Marketplace::new();
    for user in ["u1", "u2"] {
        market.add_user(user).await;
    }
    // u1's own listing must never come back.
    market.add_item("mine", "u1", "books").await;
    for i in 0..5 {
        market.add_item(&format!("i{i}"), "u2", "books").await;
    }
    // Live inbound bids exclude i1 and i3 from u1's view.
    market.add_bid("b1", "u2", "i1", "mine").await;
    market.add_bid("b2", "u2", "i3", "mine").await;

    let discovery = market.discovery(1);
    let mut request = DiscoverRequest {
        user_id: "u1".to_string(),
        ..Default::default()
    };
    let mut seen = Vec::new();
    loop {
        let page = discovery.discover(request.clone()).await.unwrap();
        for item in page.items {
            assert_ne!(item.user_id, "u1");
            assert_eq!(item.status, ItemStatus::Available);
            seen.push(item.item_id);
        }
        match page.cursor {
            Some(cursor) => request.cursor = Some(cursor),
            None => break,
        }
    }

    seen.sort_unstable();
    assert_eq!(seen, vec!["i0", "i2", "i4"]);
}

// ═══════════════════════════════════════════════════════════════════════════
// REQUEST BOUNDARY
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn dispatcher_round_trip_with_configured_paging() {
    let store = Arc::new(InMemoryStore::new());
    let config: AppConfig = swapmeet_config::ConfigLoader::from_toml(
        r#"
        [discovery]
        page_size = 2
        "#,
    )
    .unwrap();
    let dispatcher = Dispatcher::new(store, &config);

    for (item, owner) in [("i1", "u1"), ("i2", "u2"), ("i3", "u2"), ("i4", "u2")] {
        let response = dispatcher
            .dispatch(Request::CreateItem(NewItem {
                item_id: Some(item.to_string()),
                user_id: owner.to_string(),
                category: "books".to_string(),
            }))
            .await;
        assert!(response.is_success());
    }

    let page = dispatcher
        .dispatch(Request::Discover(DiscoverRequest {
            user_id: "u1".to_string(),
            ..Default::default()
        }))
        .await;
    assert!(page.is_success());
    assert_eq!(page.body["items"].as_array().unwrap().len(), 2);
    assert!(page.body["cursor"].is_string());

    let missing = dispatcher
        .dispatch(Request::Settle(SettleParams {
            bid_id: "bid-ghost".to_string(),
        }))
        .await;
    assert_eq!(missing.status, 404);
}
