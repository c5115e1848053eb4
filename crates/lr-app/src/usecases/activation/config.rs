use std::time::Duration;

use lr_core::activation::ActivationStep;
use lr_core::config::{ActivationConfig, InFlightPolicy};
use lr_core::CapabilityTier;

const DEFAULT_PERMISSION_TIMEOUT_SECS: u64 = 120;
const DEFAULT_HARDWARE_TIMEOUT_SECS: u64 = 120;
const DEFAULT_SERVICE_TIMEOUT_SECS: u64 = 300;

/// Activation orchestrator configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationOrchestratorConfig {
    /// Resolved once; decides the required permission set.
    pub tier: CapabilityTier,
    pub in_flight_policy: InFlightPolicy,
    /// Wait for the permission dialog result
    pub permission_timeout: Duration,
    /// Wait for the hardware enable dialog result
    pub hardware_timeout: Duration,
    /// Wait for the dependent service to turn on
    pub service_timeout: Duration,
}

impl Default for ActivationOrchestratorConfig {
    fn default() -> Self {
        Self::from_config(&ActivationConfig::empty())
    }
}

impl ActivationOrchestratorConfig {
    pub fn from_config(config: &ActivationConfig) -> Self {
        let timeout = |secs: Option<u64>, default: u64| {
            Duration::from_secs(secs.unwrap_or(default).max(1))
        };

        Self {
            tier: CapabilityTier::resolve(config.tier, config.platform_version)
                .unwrap_or(CapabilityTier::Modern),
            in_flight_policy: config.in_flight_policy.unwrap_or(InFlightPolicy::Supersede),
            permission_timeout: timeout(
                config.permission_timeout_secs,
                DEFAULT_PERMISSION_TIMEOUT_SECS,
            ),
            hardware_timeout: timeout(config.hardware_timeout_secs, DEFAULT_HARDWARE_TIMEOUT_SECS),
            service_timeout: timeout(config.service_timeout_secs, DEFAULT_SERVICE_TIMEOUT_SECS),
        }
    }

    pub fn with_tier(mut self, tier: CapabilityTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_in_flight_policy(mut self, policy: InFlightPolicy) -> Self {
        self.in_flight_policy = policy;
        self
    }

    pub fn timeout_for(&self, step: ActivationStep) -> Duration {
        match step {
            ActivationStep::Permissions => self.permission_timeout,
            ActivationStep::HardwareEnable => self.hardware_timeout,
            ActivationStep::ServiceActive => self.service_timeout,
            // Never suspended; bounded anyway so a misuse cannot hang.
            ActivationStep::Capability => self.permission_timeout,
        }
    }
}
