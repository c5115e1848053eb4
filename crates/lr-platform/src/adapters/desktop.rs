//! Desktop stand-ins for collaborators that only exist on mobile hosts.
//!
//! Linux desktops have no runtime permission dialog and no separate location
//! service gating bluetooth scans, so these adapters report the prerequisite as
//! already satisfied.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use lr_core::ports::{
    HostSurfacePort, PermissionGatewayPort, PlatformError, ServiceStatusListener,
    ServiceStatusSourcePort,
};
use lr_core::{Permission, PermissionGrant};

/// Every permission is implicitly granted.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImplicitPermissionGateway;

#[async_trait]
impl PermissionGatewayPort for ImplicitPermissionGateway {
    fn check(&self, _permission: Permission) -> Result<PermissionGrant, PlatformError> {
        Ok(PermissionGrant::Granted)
    }

    async fn request(
        &self,
        permissions: Vec<Permission>,
    ) -> Result<HashMap<Permission, PermissionGrant>, PlatformError> {
        Ok(permissions
            .into_iter()
            .map(|permission| (permission, PermissionGrant::Granted))
            .collect())
    }
}

/// The dependent service is always on; listeners never fire.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysActiveServiceSource;

impl ServiceStatusSourcePort for AlwaysActiveServiceSource {
    fn is_active(&self) -> Result<bool, PlatformError> {
        Ok(true)
    }

    fn register_listener(
        &self,
        _listener: Arc<dyn ServiceStatusListener>,
    ) -> Result<(), PlatformError> {
        Ok(())
    }

    fn unregister_listener(&self) -> Result<(), PlatformError> {
        Ok(())
    }
}

/// Host surface for headless runs: asks the operator through the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHostSurface;

impl HostSurfacePort for LoggingHostSurface {
    fn present_service_settings(&self) -> Result<(), PlatformError> {
        log::warn!("dependent service is off, enable it in the system settings to continue");
        Ok(())
    }
}
