use std::sync::Arc;

use super::PlatformError;

/// Receiver of dependent-service status changes.
///
/// Platforms may call this from any thread.
pub trait ServiceStatusListener: Send + Sync {
    /// `Err` means the platform could not read the new status.
    fn on_service_status_changed(&self, status: Result<bool, PlatformError>);
}

/// Platform source of dependent-service status.
///
/// Registration is not required to be idempotent here; the application layer
/// wraps this port and guarantees idempotence.
pub trait ServiceStatusSourcePort: Send + Sync {
    fn is_active(&self) -> Result<bool, PlatformError>;

    fn register_listener(&self, listener: Arc<dyn ServiceStatusListener>)
        -> Result<(), PlatformError>;

    fn unregister_listener(&self) -> Result<(), PlatformError>;
}
