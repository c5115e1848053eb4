use serde::{Deserialize, Serialize};

use super::ActivationError;

/// Terminal outcome of one activation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationOutcome {
    /// All prerequisites are satisfied.
    Ready,
    /// The user denied a permission or declined the hardware enable request.
    Rejected(ActivationError),
    /// Orchestration failed unexpectedly, timed out, or the request was displaced.
    Failed(ActivationError),
    /// The hardware capability is absent on this device.
    Unsupported,
}

impl ActivationOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, ActivationOutcome::Ready)
    }

    pub fn error(&self) -> Option<&ActivationError> {
        match self {
            ActivationOutcome::Rejected(err) | ActivationOutcome::Failed(err) => Some(err),
            ActivationOutcome::Ready | ActivationOutcome::Unsupported => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ActivationOutcome::Ready => "ready",
            ActivationOutcome::Rejected(_) => "activation_rejected",
            ActivationOutcome::Failed(_) => "activation_failed",
            ActivationOutcome::Unsupported => "unsupported_feature",
        }
    }
}

impl From<ActivationError> for ActivationOutcome {
    fn from(err: ActivationError) -> Self {
        match err {
            ActivationError::UnsupportedCapability => ActivationOutcome::Unsupported,
            ActivationError::PermissionDenied { .. } | ActivationError::HardwareEnableRejected => {
                ActivationOutcome::Rejected(err)
            }
            other => ActivationOutcome::Failed(other),
        }
    }
}

/// Consumer-facing terminal callback surface.
///
/// Exactly one method fires per activation request.
pub trait ActivationCallback: Send + Sync {
    fn on_ready(&self);
    fn on_activation_rejected(&self);
    fn on_activation_failed(&self);
    fn on_unsupported_feature(&self);

    /// Routes an outcome to the matching terminal method.
    fn deliver(&self, outcome: &ActivationOutcome) {
        match outcome {
            ActivationOutcome::Ready => self.on_ready(),
            ActivationOutcome::Rejected(_) => self.on_activation_rejected(),
            ActivationOutcome::Failed(_) => self.on_activation_failed(),
            ActivationOutcome::Unsupported => self.on_unsupported_feature(),
        }
    }
}
