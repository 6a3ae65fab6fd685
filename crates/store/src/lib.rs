pub mod cursor;
pub mod memory;
pub mod store;

pub use cursor::*;
pub use memory::*;
pub use store::*;
