//! # Configuration Loader
//!
//! Reads the host TOML file and maps it onto the section DTOs. Defaults for
//! activation values are applied later by the orchestrator config; missing
//! `[platform]`, `[simulation]` and `[logging]` sections fall back to their
//! `Default` impls.

use std::path::{Path, PathBuf};

use anyhow::Context;
use lr_core::config::ActivationConfig;
use lr_platform::SimulationScript;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "LINKREADY_CONFIG";

/// Which adapters back the activation ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// sysfs probe, rfkill switch, desktop stand-ins.
    #[default]
    Linux,
    /// Scripted answers from `[simulation]`.
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub backend: Backend,
    pub sysfs_root: PathBuf,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            sysfs_root: PathBuf::from(lr_platform::DEFAULT_SYSFS_ROOT),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also write logs to `<data_dir>/linkready/logs/linkready.log`.
    pub file: bool,
}

/// Everything the host binary reads from its config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostConfig {
    pub activation: ActivationConfig,
    pub platform: PlatformConfig,
    pub simulation: SimulationScript,
    pub logging: LoggingConfig,
}

impl HostConfig {
    pub fn from_toml(value: &toml::Value) -> anyhow::Result<Self> {
        Ok(Self {
            activation: ActivationConfig::from_toml(value)?,
            platform: section(value, "platform")?,
            simulation: section(value, "simulation")?,
            logging: section(value, "logging")?,
        })
    }
}

fn section<T: DeserializeOwned + Default>(value: &toml::Value, name: &str) -> anyhow::Result<T> {
    match value.get(name) {
        Some(table) => table
            .clone()
            .try_into()
            .with_context(|| format!("Invalid [{name}] section")),
        None => Ok(T::default()),
    }
}

/// `<config_dir>/linkready/config.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("linkready").join("config.toml"))
}

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns error if the file cannot be read, is not valid TOML, or a section
/// has values of the wrong type.
pub fn load_config(config_path: &Path) -> anyhow::Result<HostConfig> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    HostConfig::from_toml(&toml_value)
        .with_context(|| format!("Invalid config file: {}", config_path.display()))
}

/// Locate and load the host configuration.
///
/// An explicit `LINKREADY_CONFIG` path must exist. The default location is
/// optional: when absent the empty configuration is used.
pub fn load_host_config() -> anyhow::Result<HostConfig> {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        return load_config(Path::new(&path));
    }

    match default_config_path() {
        Some(path) if path.exists() => load_config(&path),
        _ => Ok(HostConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lr_core::config::InFlightPolicy;
    use lr_core::Permission;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_config_reads_all_sections() {
        let file = write_config(
            r#"
            [activation]
            tier = "legacy"
            in_flight_policy = "reject"
            service_timeout_secs = 30

            [platform]
            backend = "simulated"

            [simulation]
            granted_permissions = ["access_fine_location"]
            resume_after_ms = 1500

            [logging]
            file = true
            "#,
        );

        let config = load_config(file.path()).unwrap();

        assert_eq!(config.activation.in_flight_policy, Some(InFlightPolicy::Reject));
        assert_eq!(config.activation.service_timeout_secs, Some(30));
        assert_eq!(config.platform.backend, Backend::Simulated);
        assert_eq!(config.platform.sysfs_root, PathBuf::from("/sys"));
        assert_eq!(
            config.simulation.granted_permissions,
            vec![Permission::AccessFineLocation]
        );
        assert_eq!(config.simulation.resume_after_ms, Some(1500));
        assert!(config.logging.file);
    }

    #[test]
    fn test_load_config_empty_file_is_default() {
        let file = write_config("");
        assert_eq!(load_config(file.path()).unwrap(), HostConfig::default());
    }

    #[test]
    fn test_load_config_rejects_unknown_backend() {
        let file = write_config("[platform]\nbackend = \"bluez\"\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("[platform]"));
    }

    #[test]
    fn test_load_config_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join("absent.toml")).is_err());
    }
}
