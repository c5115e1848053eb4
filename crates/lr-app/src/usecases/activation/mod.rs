//! Activation use case.
//!
//! This module exposes the activation orchestrator and the service status
//! subscription it owns while waiting for the dependent service.

mod config;
mod context;
pub mod orchestrator;
mod subscriber;

pub use config::ActivationOrchestratorConfig;
pub use orchestrator::{ActivationOrchestrator, ActivationPorts};
pub use subscriber::{ServiceStatusSubscriber, SubscriptionHandle};
