//! # Pure Data Module - Data Transfer Objects Only
//!
//! ## Responsibilities
//!
//! - ✅ Define configuration data structures
//! - ✅ Provide TOML → DTO mapping
//!
//! ## Prohibited
//!
//! ❌ **No business logic or policies**
//! ❌ **No default value calculation**
//!
//! Missing keys stay `None`; the application layer decides what they mean.

mod activation_config;

pub use activation_config::{ActivationConfig, InFlightPolicy};
