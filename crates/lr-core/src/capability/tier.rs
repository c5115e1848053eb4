use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::permission::Permission;

/// First platform version that uses the dedicated scan/connect permission pair.
pub const MODERN_TIER_MIN_PLATFORM_VERSION: u32 = 31;

const LEGACY_PERMISSIONS: &[Permission] = &[Permission::AccessFineLocation];
const MODERN_PERMISSIONS: &[Permission] = &[Permission::BluetoothScan, Permission::BluetoothConnect];

/// Resolved configuration bucket determining the required permission set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityTier {
    /// Radio access is gated by a single location permission.
    Legacy,
    /// Radio access is gated by the scan + connect permission pair.
    Modern,
}

impl CapabilityTier {
    pub fn from_platform_version(version: u32) -> Self {
        if version >= MODERN_TIER_MIN_PLATFORM_VERSION {
            CapabilityTier::Modern
        } else {
            CapabilityTier::Legacy
        }
    }

    /// Resolve the tier from an explicit override, falling back to the platform version.
    ///
    /// Returns `None` when neither fact is known; callers pick their own default.
    pub fn resolve(explicit: Option<CapabilityTier>, platform_version: Option<u32>) -> Option<Self> {
        explicit.or_else(|| platform_version.map(Self::from_platform_version))
    }

    pub fn required_permissions(&self) -> &'static [Permission] {
        match self {
            CapabilityTier::Legacy => LEGACY_PERMISSIONS,
            CapabilityTier::Modern => MODERN_PERMISSIONS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityTier::Legacy => "legacy",
            CapabilityTier::Modern => "modern",
        }
    }
}

impl fmt::Display for CapabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown capability tier: {0}")]
pub struct TierParseError(pub String);

impl FromStr for CapabilityTier {
    type Err = TierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(CapabilityTier::Legacy),
            "modern" => Ok(CapabilityTier::Modern),
            other => Err(TierParseError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundary_follows_platform_version() {
        assert_eq!(CapabilityTier::from_platform_version(30), CapabilityTier::Legacy);
        assert_eq!(CapabilityTier::from_platform_version(31), CapabilityTier::Modern);
        assert_eq!(CapabilityTier::from_platform_version(34), CapabilityTier::Modern);
    }

    #[test]
    fn legacy_and_modern_permission_sets_are_disjoint() {
        let legacy = CapabilityTier::Legacy.required_permissions();
        let modern = CapabilityTier::Modern.required_permissions();
        assert_eq!(legacy, &[Permission::AccessFineLocation]);
        assert_eq!(modern.len(), 2);
        assert!(legacy.iter().all(|p| !modern.contains(p)));
    }

    #[test]
    fn explicit_tier_wins_over_platform_version() {
        assert_eq!(
            CapabilityTier::resolve(Some(CapabilityTier::Legacy), Some(33)),
            Some(CapabilityTier::Legacy)
        );
        assert_eq!(
            CapabilityTier::resolve(None, Some(29)),
            Some(CapabilityTier::Legacy)
        );
        assert_eq!(CapabilityTier::resolve(None, None), None);
    }

    #[test]
    fn tier_parses_case_insensitively() {
        assert_eq!("Modern".parse::<CapabilityTier>(), Ok(CapabilityTier::Modern));
        assert!("quantum".parse::<CapabilityTier>().is_err());
    }
}
