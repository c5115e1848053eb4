//! Port wiring for the configured backend.

use std::sync::Arc;
use std::time::Duration;

use lr_app::ActivationPorts;
use lr_platform::{
    AlwaysActiveServiceSource, ImplicitPermissionGateway, LoggingHostSurface,
    RfkillHardwareEnabler, SimulatedPlatform, SimulationScript, SysfsCapabilityProbe,
};
use tracing::info;

use super::config::{Backend, PlatformConfig};

/// Ports for the orchestrator plus host-side behaviour of the backend.
pub struct WiredPlatform {
    pub ports: ActivationPorts,
    /// Deliver a host resume this long after activation starts.
    pub resume_after: Option<Duration>,
}

pub fn wire_platform(platform: &PlatformConfig, script: &SimulationScript) -> WiredPlatform {
    match platform.backend {
        Backend::Linux => {
            info!(sysfs_root = %platform.sysfs_root.display(), "wiring linux backend");
            WiredPlatform {
                ports: ActivationPorts {
                    capability_probe: Arc::new(SysfsCapabilityProbe::new(&platform.sysfs_root)),
                    permission_gateway: Arc::new(ImplicitPermissionGateway),
                    hardware_enabler: Arc::new(RfkillHardwareEnabler::new(&platform.sysfs_root)),
                    service_status: Arc::new(AlwaysActiveServiceSource),
                    host_surface: Arc::new(LoggingHostSurface),
                },
                resume_after: None,
            }
        }
        Backend::Simulated => {
            info!(?script, "wiring simulated backend");
            let simulated = Arc::new(SimulatedPlatform::new(script.clone()));
            WiredPlatform {
                ports: ActivationPorts {
                    capability_probe: simulated.clone(),
                    permission_gateway: simulated.clone(),
                    hardware_enabler: simulated.clone(),
                    service_status: simulated.clone(),
                    host_surface: simulated,
                },
                resume_after: script.resume_after_ms.map(Duration::from_millis),
            }
        }
    }
}
