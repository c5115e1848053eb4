use std::fmt;

use serde::{Deserialize, Serialize};

use crate::permission::Permission;

/// One of the four prerequisites, used to tag errors and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationStep {
    Capability,
    Permissions,
    HardwareEnable,
    ServiceActive,
}

impl fmt::Display for ActivationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActivationStep::Capability => "capability",
            ActivationStep::Permissions => "permissions",
            ActivationStep::HardwareEnable => "hardware_enable",
            ActivationStep::ServiceActive => "service_active",
        };
        f.write_str(name)
    }
}

/// Activation error taxonomy.
///
/// Only the terminal kinds ever reach a consumer, and only through
/// [`ActivationCallback`](super::ActivationCallback); nothing here is returned
/// from the orchestrator's public surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ActivationError {
    #[error("required hardware capability is not supported on this device")]
    UnsupportedCapability,

    #[error("required permissions denied: {permissions:?}")]
    PermissionDenied { permissions: Vec<Permission> },

    #[error("hardware enable request was rejected")]
    HardwareEnableRejected,

    /// Recovered internally by the next host resume; never delivered.
    #[error("service status subscription degraded: {reason}")]
    TransientSubscriptionFailure { reason: String },

    #[error("{step} step failed: {message}")]
    UnexpectedOrchestration {
        step: ActivationStep,
        message: String,
    },

    #[error("{step} step timed out")]
    StepTimedOut { step: ActivationStep },

    #[error("activation request superseded by a newer request")]
    Superseded,

    #[error("an activation request is already in flight")]
    AlreadyInFlight,
}

impl ActivationError {
    pub fn orchestration(step: ActivationStep, err: impl fmt::Display) -> Self {
        ActivationError::UnexpectedOrchestration {
            step,
            message: err.to_string(),
        }
    }

    /// Whether a fresh `activate()` call can possibly succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ActivationError::UnsupportedCapability)
    }
}
