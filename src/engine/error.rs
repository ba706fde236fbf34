use ulid::Ulid;

use crate::store::StoreError;

#[derive(Debug)]
pub enum DeskError {
    /// Request malformed or missing a required field; no store access made.
    InvalidInput(&'static str),
    /// Field or count above a hard cap from `limits`.
    LimitExceeded(&'static str),
    /// An admission rule refused the request; carries the rule's reason.
    Rejected(&'static str),
    /// Referenced booking does not exist.
    NotFound(Ulid),
    /// Store failure, propagated as-is.
    Store(StoreError),
}

impl std::fmt::Display for DeskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeskError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            DeskError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            DeskError::Rejected(reason) => write!(f, "rejected: {reason}"),
            DeskError::NotFound(id) => write!(f, "booking not found: {id}"),
            DeskError::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DeskError {}

impl From<StoreError> for DeskError {
    fn from(e: StoreError) -> Self {
        DeskError::Store(e)
    }
}
