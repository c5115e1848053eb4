use std::str::FromStr;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::capability::CapabilityTier;

/// What `activate()` does while another request is still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InFlightPolicy {
    /// Fail the old request and restart the sequence for the new one.
    Supersede,
    /// Fail the new request immediately and keep the old one running.
    Reject,
}

impl FromStr for InFlightPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "supersede" => Ok(InFlightPolicy::Supersede),
            "reject" => Ok(InFlightPolicy::Reject),
            other => Err(anyhow!("unknown in-flight policy: {other}")),
        }
    }
}

/// Activation configuration DTO (pure data, no logic)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationConfig {
    /// Explicit capability tier; wins over `platform_version`.
    pub tier: Option<CapabilityTier>,

    /// Host platform version used to derive the tier.
    pub platform_version: Option<u32>,

    pub in_flight_policy: Option<InFlightPolicy>,

    pub permission_timeout_secs: Option<u64>,

    pub hardware_timeout_secs: Option<u64>,

    pub service_timeout_secs: Option<u64>,
}

impl ActivationConfig {
    /// Create ActivationConfig from the `[activation]` table of a TOML value.
    ///
    /// Values of the wrong type are reported; absent values stay `None`.
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let section = toml_value.get("activation");
        let get = |key: &str| section.and_then(|s| s.get(key));

        let tier = get("tier")
            .and_then(|v| v.as_str())
            .map(CapabilityTier::from_str)
            .transpose()
            .context("invalid activation.tier")?;

        let in_flight_policy = get("in_flight_policy")
            .and_then(|v| v.as_str())
            .map(InFlightPolicy::from_str)
            .transpose()
            .context("invalid activation.in_flight_policy")?;

        Ok(Self {
            tier,
            platform_version: read_u64(get("platform_version"), "activation.platform_version")?
                .map(|v| v.min(u32::MAX as u64) as u32),
            in_flight_policy,
            permission_timeout_secs: read_u64(
                get("permission_timeout_secs"),
                "activation.permission_timeout_secs",
            )?,
            hardware_timeout_secs: read_u64(
                get("hardware_timeout_secs"),
                "activation.hardware_timeout_secs",
            )?,
            service_timeout_secs: read_u64(
                get("service_timeout_secs"),
                "activation.service_timeout_secs",
            )?,
        })
    }

    /// Create empty ActivationConfig (every fact unknown)
    pub fn empty() -> Self {
        Self::default()
    }
}

fn read_u64(value: Option<&toml::Value>, key: &str) -> anyhow::Result<Option<u64>> {
    match value {
        None => Ok(None),
        Some(v) => {
            let raw = v
                .as_integer()
                .ok_or_else(|| anyhow!("{key} must be an integer"))?;
            let parsed = u64::try_from(raw).map_err(|_| anyhow!("{key} must not be negative"))?;
            Ok(Some(parsed))
        }
    }
}
