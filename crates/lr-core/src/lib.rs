//! # lr-core
//!
//! Core domain models and business logic for LinkReady.
//!
//! This crate contains pure business logic without any infrastructure dependencies:
//! the activation state machine, the capability tier model, and the ports the
//! orchestrator consumes.

// Public module exports
pub mod activation;
pub mod capability;
pub mod config;
pub mod permission;
pub mod ports;

// Re-export commonly used types at the crate root
pub use activation::{
    ActivationAction, ActivationCallback, ActivationError, ActivationEvent, ActivationOutcome,
    ActivationState, ActivationStateMachine, ActivationStep,
};
pub use capability::CapabilityTier;
pub use config::ActivationConfig;
pub use permission::{EnableDecision, Permission, PermissionGrant};
