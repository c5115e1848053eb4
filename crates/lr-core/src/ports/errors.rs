use thiserror::Error;

/// Failure reported by a platform adapter.
///
/// Never crosses the orchestrator boundary; it is converted into an
/// [`ActivationError`](crate::activation::ActivationError) or a degraded listener.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("host surface unavailable: {0}")]
    HostUnavailable(String),

    #[error("platform query failed: {0}")]
    QueryFailed(String),

    #[error("platform request failed: {0}")]
    RequestFailed(String),

    #[error("listener registration failed: {0}")]
    Registration(String),
}
