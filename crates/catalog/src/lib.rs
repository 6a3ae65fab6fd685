pub mod bids;
pub mod items;
pub mod users;

pub use bids::*;
pub use items::*;
pub use users::*;

fn now_unix() -> u64 {
    chrono::Utc::now().timestamp() as u64
}
