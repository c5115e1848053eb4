use super::PlatformError;

/// Port to the surface hosting the activation flow.
pub trait HostSurfacePort: Send + Sync {
    /// Present a path for the user to turn the dependent service on.
    ///
    /// Returns [`PlatformError::HostUnavailable`] when there is no foreground
    /// surface to present from.
    fn present_service_settings(&self) -> Result<(), PlatformError>;
}
