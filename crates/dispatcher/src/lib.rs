pub mod dispatcher;
pub mod requests;

pub use dispatcher::*;
pub use requests::*;

use tracing_subscriber::EnvFilter;

/// Initialize structured logging for binaries built on the dispatcher.
///
/// `RUST_LOG` wins over the configured default level.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
