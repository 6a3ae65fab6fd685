//! Swapmeet: a barter marketplace built around two consistency-critical
//! paths: settlement (accepting a bid atomically retires both items and
//! all competing bids) and discovery (paginated candidate scanning with an
//! exclusion filter). Everything else is single-record bookkeeping.

pub use swapmeet_catalog as catalog;
pub use swapmeet_config as config;
pub use swapmeet_discovery as discovery;
pub use swapmeet_dispatcher as dispatcher;
pub use swapmeet_settlement as settlement;
pub use swapmeet_store as store;
pub use swapmeet_types as types;
