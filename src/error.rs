// Error taxonomy: source reads, observer delivery, periodic cycle.

use std::time::Duration;

/// Sampling one metric category (or one partition) failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error("not supported on this platform: {0}")]
    Unsupported(&'static str),
    #[error("metrics source lock poisoned: {0}")]
    Poisoned(String),
}

/// Pushing a message to one observer failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeliveryError {
    #[error("observer channel closed")]
    Closed,
    #[error("send timed out after {0:?}")]
    Timeout(Duration),
    #[error("snapshot encoding failed: {0}")]
    Encode(String),
}

/// Unexpected failure in the periodic task outside the per-category boundaries.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("cycle panicked: {0}")]
    Panicked(String),
}
