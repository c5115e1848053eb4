//! Capability tier model.
//!
//! The tier decides which concrete permission set the host requires before the
//! radio may be used. It is resolved once per process and then treated as
//! immutable configuration, so the activation checks never branch on platform
//! versions themselves.

mod tier;

pub use tier::{CapabilityTier, TierParseError, MODERN_TIER_MIN_PLATFORM_VERSION};
