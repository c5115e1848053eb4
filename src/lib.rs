//! LinkReady host library
//!
//! Loads configuration, installs tracing, wires a platform backend into the
//! activation orchestrator and runs a single activation.

pub mod bootstrap;

pub use bootstrap::{run, HostConfig};
