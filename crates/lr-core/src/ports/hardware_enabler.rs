use async_trait::async_trait;

use super::PlatformError;
use crate::permission::EnableDecision;

/// Port for the radio's on/off state.
///
/// # Behavior
/// - `is_enabled()` is a cheap synchronous query.
/// - `request_enable()` asks the user (or the system) to switch the radio on and
///   resolves with their decision.
#[async_trait]
pub trait HardwareEnablerPort: Send + Sync {
    fn is_enabled(&self) -> Result<bool, PlatformError>;

    async fn request_enable(&self) -> Result<EnableDecision, PlatformError>;
}
