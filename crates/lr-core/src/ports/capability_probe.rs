/// Port answering whether the device has the required hardware capability at all.
///
/// Synchronous and side-effect-free; the answer never changes for a given device.
pub trait CapabilityProbePort: Send + Sync {
    fn is_supported(&self) -> bool;
}
