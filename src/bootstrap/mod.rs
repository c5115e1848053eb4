pub mod config;
pub mod run;
pub mod tracing;
pub mod wiring;

pub use config::{
    default_config_path, load_config, load_host_config, Backend, HostConfig, LoggingConfig,
    PlatformConfig, CONFIG_ENV_VAR,
};
pub use run::{run, run_activation, Terminal};
pub use wiring::{wire_platform, WiredPlatform};
