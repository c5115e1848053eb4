//! # lr-platform
//!
//! Platform-specific implementations for LinkReady.
//!
//! This crate contains the adapters behind the activation ports: hardware
//! detection through sysfs, the rfkill switch, desktop stand-ins for the
//! permission and service collaborators, and a scripted simulation backend.

pub mod adapters;
pub mod capability;

pub use adapters::{
    AlwaysActiveServiceSource, ImplicitPermissionGateway, LoggingHostSurface,
    RfkillHardwareEnabler, SimulatedPlatform, SimulationScript,
};
pub use capability::SysfsCapabilityProbe;

/// Default sysfs mount point.
pub const DEFAULT_SYSFS_ROOT: &str = "/sys";
