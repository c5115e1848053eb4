//! Port interfaces for the application layer
//!
//! Ports define the contract between the activation orchestrator and the host
//! platform. The orchestrator only ever sees these traits; whichever surface
//! hosts it injects concrete adapters.
//!
//! ## Port Placement Guidelines
//!
//! A port belongs here when it represents a platform capability the
//! orchestrator consumes and the platform layer implements.

pub mod capability_probe;
pub mod errors;
pub mod hardware_enabler;
pub mod host_surface;
pub mod permission_gateway;
pub mod service_status;

pub use capability_probe::CapabilityProbePort;
pub use errors::PlatformError;
pub use hardware_enabler::HardwareEnablerPort;
pub use host_surface::HostSurfacePort;
pub use permission_gateway::PermissionGatewayPort;
pub use service_status::{ServiceStatusListener, ServiceStatusSourcePort};
