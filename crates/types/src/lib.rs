pub mod bid;
pub mod error;
pub mod item;
pub mod user;

pub use bid::*;
pub use error::*;
pub use item::*;
pub use user::*;
