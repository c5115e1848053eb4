pub mod activation;

pub use activation::{ActivationOrchestrator, ActivationOrchestratorConfig, ActivationPorts};
