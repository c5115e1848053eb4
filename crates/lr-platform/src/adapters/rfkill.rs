use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lr_core::ports::{HardwareEnablerPort, PlatformError};
use lr_core::EnableDecision;

/// Hardware switch backed by the kernel rfkill class.
///
/// Reads `<sysfs_root>/class/rfkill/*/{type,soft,hard}` and clears the soft
/// block of every bluetooth switch on request. A hard block (physical switch)
/// cannot be cleared from software and is reported as a rejection.
#[derive(Debug, Clone)]
pub struct RfkillHardwareEnabler {
    sysfs_root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RfkillSwitch {
    path: PathBuf,
    soft_blocked: bool,
    hard_blocked: bool,
}

impl RfkillHardwareEnabler {
    pub fn new(sysfs_root: impl Into<PathBuf>) -> Self {
        Self {
            sysfs_root: sysfs_root.into(),
        }
    }

    fn bluetooth_switches(&self) -> Result<Vec<RfkillSwitch>, PlatformError> {
        let dir = self.sysfs_root.join("class").join("rfkill");
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(PlatformError::QueryFailed(format!(
                    "read {}: {err}",
                    dir.display()
                )))
            }
        };

        let mut switches = Vec::new();
        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();
            if read_attr(&path, "type").as_deref() != Some("bluetooth") {
                continue;
            }
            switches.push(RfkillSwitch {
                soft_blocked: read_attr(&path, "soft").as_deref() == Some("1"),
                hard_blocked: read_attr(&path, "hard").as_deref() == Some("1"),
                path,
            });
        }
        Ok(switches)
    }
}

impl Default for RfkillHardwareEnabler {
    fn default() -> Self {
        Self::new(crate::DEFAULT_SYSFS_ROOT)
    }
}

fn read_attr(switch: &Path, name: &str) -> Option<String> {
    std::fs::read_to_string(switch.join(name))
        .ok()
        .map(|value| value.trim().to_string())
}

#[async_trait]
impl HardwareEnablerPort for RfkillHardwareEnabler {
    fn is_enabled(&self) -> Result<bool, PlatformError> {
        let switches = self.bluetooth_switches()?;
        // No switch means nothing is blocking the radio.
        Ok(switches
            .iter()
            .all(|switch| !switch.soft_blocked && !switch.hard_blocked))
    }

    async fn request_enable(&self) -> Result<EnableDecision, PlatformError> {
        let switches = self.bluetooth_switches()?;

        if let Some(blocked) = switches.iter().find(|switch| switch.hard_blocked) {
            log::warn!(
                "bluetooth is hard-blocked at {}, cannot enable from software",
                blocked.path.display()
            );
            return Ok(EnableDecision::Rejected);
        }

        for switch in switches.iter().filter(|switch| switch.soft_blocked) {
            let soft = switch.path.join("soft");
            match tokio::fs::write(&soft, "0").await {
                Ok(()) => log::info!("cleared rfkill soft block at {}", soft.display()),
                Err(err) if err.kind() == ErrorKind::PermissionDenied => {
                    log::warn!("not allowed to clear rfkill soft block at {}", soft.display());
                    return Ok(EnableDecision::Rejected);
                }
                Err(err) => {
                    return Err(PlatformError::RequestFailed(format!(
                        "write {}: {err}",
                        soft.display()
                    )))
                }
            }
        }

        Ok(EnableDecision::Accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn add_switch(root: &Path, name: &str, kind: &str, soft: &str, hard: &str) -> PathBuf {
        let dir = root.join("class/rfkill").join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("type"), format!("{kind}\n")).unwrap();
        std::fs::write(dir.join("soft"), format!("{soft}\n")).unwrap();
        std::fs::write(dir.join("hard"), format!("{hard}\n")).unwrap();
        dir
    }

    #[test]
    fn no_rfkill_class_counts_as_enabled() {
        let root = TempDir::new().unwrap();
        assert!(RfkillHardwareEnabler::new(root.path()).is_enabled().unwrap());
    }

    #[test]
    fn soft_blocked_bluetooth_is_disabled_and_wlan_is_ignored() {
        let root = TempDir::new().unwrap();
        add_switch(root.path(), "rfkill0", "wlan", "1", "0");
        add_switch(root.path(), "rfkill1", "bluetooth", "1", "0");

        assert!(!RfkillHardwareEnabler::new(root.path()).is_enabled().unwrap());
    }

    #[tokio::test]
    async fn request_enable_clears_soft_block() {
        let root = TempDir::new().unwrap();
        let wlan = add_switch(root.path(), "rfkill0", "wlan", "1", "0");
        let bluetooth = add_switch(root.path(), "rfkill1", "bluetooth", "1", "0");
        let enabler = RfkillHardwareEnabler::new(root.path());

        let decision = enabler.request_enable().await.unwrap();

        assert_eq!(decision, EnableDecision::Accepted);
        assert_eq!(std::fs::read_to_string(bluetooth.join("soft")).unwrap(), "0");
        assert_eq!(std::fs::read_to_string(wlan.join("soft")).unwrap(), "1\n");
        assert!(enabler.is_enabled().unwrap());
    }

    #[tokio::test]
    async fn hard_block_is_rejected_without_writing() {
        let root = TempDir::new().unwrap();
        let bluetooth = add_switch(root.path(), "rfkill0", "bluetooth", "1", "1");
        let enabler = RfkillHardwareEnabler::new(root.path());

        let decision = enabler.request_enable().await.unwrap();

        assert_eq!(decision, EnableDecision::Rejected);
        assert_eq!(std::fs::read_to_string(bluetooth.join("soft")).unwrap(), "1\n");
    }
}
