use serde::{Deserialize, Serialize};
use swapmeet_catalog::{NewBid, NewItem, NewUser};
use swapmeet_discovery::DiscoverRequest;
use swapmeet_types::{BidStatus, ExchangeError};

// ═══════════════════════════════════════════════════════════════════════════
// REQUEST RECORDS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettleParams {
    pub bid_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemIdParams {
    pub item_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidIdParams {
    pub bid_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdParams {
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateItemParams {
    pub item_id: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivedBidsParams {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BidStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneParams {
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserParams {
    pub user_id: String,
    pub phone_number: String,
}

/// Every marketplace verb with its plain parameter record. Transports
/// deserialize into this and hand it to the dispatcher; nothing dynamically
/// typed crosses the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "verb", content = "params", rename_all = "snake_case")]
pub enum Request {
    // engines
    Settle(SettleParams),
    RejectBid(BidIdParams),
    Discover(DiscoverRequest),

    // items
    CreateItem(NewItem),
    GetItem(ItemIdParams),
    ListItems(UserIdParams),
    UpdateItem(UpdateItemParams),
    DeleteItem(ItemIdParams),

    // bids
    PlaceBid(NewBid),
    GetBid(BidIdParams),
    ReceivedBids(ReceivedBidsParams),
    OfferedBids(UserIdParams),
    DeleteBid(BidIdParams),

    // users
    CreateUser(NewUser),
    GetUser(UserIdParams),
    FindUserByPhone(PhoneParams),
    UpdateUser(UpdateUserParams),
    DeleteUser(UserIdParams),
}

// ═══════════════════════════════════════════════════════════════════════════
// RESPONSE RECORD
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub body: serde_json::Value,
}

impl Response {
    pub fn ok(body: impl Serialize) -> Self {
        Self {
            status: 200,
            body: serde_json::to_value(body).expect("response body serializes"),
        }
    }

    pub fn error(err: &ExchangeError) -> Self {
        Self {
            status: status_code(err),
            body: serde_json::json!({ "error": err.to_string() }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Transport status code for each error kind. The five kinds stay
/// distinguishable; there is no generic 500.
pub fn status_code(err: &ExchangeError) -> u16 {
    match err {
        ExchangeError::InvalidArgument(_) | ExchangeError::InvalidCursor => 400,
        ExchangeError::NotFound(_) => 404,
        ExchangeError::InvalidState(_) => 409,
        ExchangeError::StoreUnavailable(_) => 503,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_map_to_distinct_codes() {
        assert_eq!(
            status_code(&ExchangeError::invalid_argument("missing")),
            400
        );
        assert_eq!(status_code(&ExchangeError::InvalidCursor), 400);
        assert_eq!(status_code(&ExchangeError::not_found("bid b-1")), 404);
        assert_eq!(status_code(&ExchangeError::invalid_state("settled")), 409);
        assert_eq!(
            status_code(&ExchangeError::StoreUnavailable("down".to_string())),
            503
        );
    }

    #[test]
    fn requests_deserialize_from_tagged_json() {
        let request: Request = serde_json::from_str(
            r#"{"verb": "settle", "params": {"bid_id": "bid-1"}}"#,
        )
        .unwrap();
        assert!(matches!(request, Request::Settle(SettleParams { ref bid_id }) if bid_id == "bid-1"));

        let request: Request = serde_json::from_str(
            r#"{"verb": "discover", "params": {"user_id": "user-1", "category": "books"}}"#,
        )
        .unwrap();
        assert!(matches!(request, Request::Discover(_)));
    }
}
