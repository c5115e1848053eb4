//! Bluetooth capability detection.
//!
//! A device supports the capability when the kernel exposes at least one
//! controller under `class/bluetooth` in sysfs.

use std::path::{Path, PathBuf};

use lr_core::ports::CapabilityProbePort;

/// Probes `<sysfs_root>/class/bluetooth` for `hci*` controllers.
#[derive(Debug, Clone)]
pub struct SysfsCapabilityProbe {
    sysfs_root: PathBuf,
}

impl SysfsCapabilityProbe {
    pub fn new(sysfs_root: impl Into<PathBuf>) -> Self {
        Self {
            sysfs_root: sysfs_root.into(),
        }
    }

    fn controllers_dir(&self) -> PathBuf {
        self.sysfs_root.join("class").join("bluetooth")
    }
}

impl Default for SysfsCapabilityProbe {
    fn default() -> Self {
        Self::new(crate::DEFAULT_SYSFS_ROOT)
    }
}

impl CapabilityProbePort for SysfsCapabilityProbe {
    fn is_supported(&self) -> bool {
        let dir = self.controllers_dir();
        let supported = has_controller(&dir);
        if supported {
            log::debug!("bluetooth controller found under {}", dir.display());
        } else {
            log::info!("no bluetooth controller under {}", dir.display());
        }
        supported
    }
}

fn has_controller(dir: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };

    entries
        .filter_map(Result::ok)
        .any(|entry| entry.file_name().to_string_lossy().starts_with("hci"))
}
