//! LinkReady Application Orchestration Layer
//!
//! This crate contains the activation use case: the orchestrator that drives the
//! precondition checks and the service status subscriber it owns.

pub mod usecases;

pub use usecases::activation::{
    ActivationOrchestrator, ActivationOrchestratorConfig, ActivationPorts,
    ServiceStatusSubscriber, SubscriptionHandle,
};
