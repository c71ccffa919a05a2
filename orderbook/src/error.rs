use thiserror::Error;

/// Rejected at order construction, before the order ever reaches a queue.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum OrderError {
    #[error("price must be a positive, finite value, got {0}")]
    NonPositivePrice(f64),
    #[error("quantity must be positive, got {0}")]
    NonPositiveQty(i64),
    #[error("symbol must not be empty")]
    EmptySymbol,
}

/// Rejected by `MatchingEngine::submit`.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    InvalidOrder(#[from] OrderError),
    #[error("ingress queue is full")]
    QueueFull,
}
