use thiserror::Error;

/// The error taxonomy shared by every marketplace operation.
///
/// Callers must be able to tell these five kinds apart; there is no
/// catch-all variant. `InvalidArgument` and `InvalidCursor` are caller
/// errors surfaced before any side effect. `StoreUnavailable` from a
/// settlement write never means partial application: the transaction either
/// fully applied or did not apply at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("invalid cursor token")]
    InvalidCursor,

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl ExchangeError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }
}
