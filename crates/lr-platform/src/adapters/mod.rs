pub mod desktop;
pub mod rfkill;
pub mod simulated;

pub use desktop::{AlwaysActiveServiceSource, ImplicitPermissionGateway, LoggingHostSurface};
pub use rfkill::RfkillHardwareEnabler;
pub use simulated::{SimulatedPlatform, SimulationScript};
