use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use uuid::Uuid;

use super::{ActivationCallback, ActivationOutcome};

/// Identifier of one activation request, used in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The single in-flight activation request.
///
/// Completing a request consumes it, so a request can never deliver twice.
pub struct ActivationRequest {
    id: RequestId,
    callback: Option<Arc<dyn ActivationCallback>>,
    started_at: Instant,
}

impl ActivationRequest {
    pub fn new(callback: Option<Arc<dyn ActivationCallback>>) -> Self {
        Self {
            id: RequestId::new(),
            callback,
            started_at: Instant::now(),
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Deliver the terminal outcome to the callback, if one was supplied.
    pub fn complete(self, outcome: ActivationOutcome) {
        #[cfg(feature = "tracing")]
        tracing::info!(
            request_id = %self.id,
            outcome = outcome.kind(),
            elapsed_ms = self.elapsed().as_millis() as u64,
            "activation request completed"
        );

        if let Some(callback) = self.callback {
            callback.deliver(&outcome);
        }
    }
}

impl fmt::Debug for ActivationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivationRequest")
            .field("id", &self.id)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}
