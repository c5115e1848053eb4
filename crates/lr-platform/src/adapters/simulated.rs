//! Scripted platform backend.
//!
//! Plays the part of a mobile host: dialogs answer after a delay and the
//! dependent service can switch itself on some time after the settings screen
//! is presented. Useful for exercising the orchestrator end-to-end without
//! hardware.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use lr_core::ports::{
    CapabilityProbePort, HardwareEnablerPort, HostSurfacePort, PermissionGatewayPort,
    PlatformError, ServiceStatusListener, ServiceStatusSourcePort,
};
use lr_core::{EnableDecision, Permission, PermissionGrant};

/// `[simulation]` section of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimulationScript {
    pub capability_supported: bool,
    pub granted_permissions: Vec<Permission>,
    /// Answer of the permission dialog.
    pub grant_on_request: bool,
    pub hardware_enabled: bool,
    /// Answer of the hardware enable dialog.
    pub accept_enable: bool,
    pub service_active: bool,
    /// Turn the service on this long after the settings screen is presented.
    pub service_activates_after_ms: Option<u64>,
    /// Deliver a failed status read instead of the first notification.
    pub listener_fails_once: bool,
    pub host_surface_available: bool,
    pub dialog_delay_ms: u64,
    /// Emit a host resume this long after activation starts.
    pub resume_after_ms: Option<u64>,
}

impl Default for SimulationScript {
    fn default() -> Self {
        Self {
            capability_supported: true,
            granted_permissions: Vec::new(),
            grant_on_request: true,
            hardware_enabled: false,
            accept_enable: true,
            service_active: false,
            service_activates_after_ms: Some(500),
            listener_fails_once: false,
            host_surface_available: true,
            dialog_delay_ms: 200,
            resume_after_ms: None,
        }
    }
}

struct SimulationState {
    granted: HashSet<Permission>,
    hardware_enabled: bool,
    service_active: bool,
    listener_failure_pending: bool,
    listener: Option<Arc<dyn ServiceStatusListener>>,
}

/// In-process platform implementing every activation port from a script.
pub struct SimulatedPlatform {
    script: SimulationScript,
    state: Arc<Mutex<SimulationState>>,
}

impl SimulatedPlatform {
    pub fn new(script: SimulationScript) -> Self {
        let state = SimulationState {
            granted: script.granted_permissions.iter().copied().collect(),
            hardware_enabled: script.hardware_enabled,
            service_active: script.service_active,
            listener_failure_pending: script.listener_fails_once,
            listener: None,
        };
        Self {
            script,
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn script(&self) -> &SimulationScript {
        &self.script
    }

    fn dialog_delay(&self) -> Duration {
        Duration::from_millis(self.script.dialog_delay_ms)
    }

    fn schedule_service_activation(&self, after: Duration) -> Result<(), PlatformError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|err| PlatformError::HostUnavailable(err.to_string()))?;
        let state = self.state.clone();

        runtime.spawn(async move {
            tokio::time::sleep(after).await;

            let (listener, status) = {
                let mut state = lock(&state);
                if state.listener_failure_pending {
                    state.listener_failure_pending = false;
                    let status = Err(PlatformError::QueryFailed(
                        "simulated status read failure".to_string(),
                    ));
                    state.service_active = true;
                    (state.listener.clone(), status)
                } else {
                    state.service_active = true;
                    (state.listener.clone(), Ok(true))
                }
            };

            log::info!("simulated service switched on");
            match listener {
                Some(listener) => listener.on_service_status_changed(status),
                None => log::debug!("no service status listener registered"),
            }
        });
        Ok(())
    }
}

fn lock(state: &Mutex<SimulationState>) -> MutexGuard<'_, SimulationState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl CapabilityProbePort for SimulatedPlatform {
    fn is_supported(&self) -> bool {
        self.script.capability_supported
    }
}

#[async_trait]
impl PermissionGatewayPort for SimulatedPlatform {
    fn check(&self, permission: Permission) -> Result<PermissionGrant, PlatformError> {
        Ok(if lock(&self.state).granted.contains(&permission) {
            PermissionGrant::Granted
        } else {
            PermissionGrant::Denied
        })
    }

    async fn request(
        &self,
        permissions: Vec<Permission>,
    ) -> Result<HashMap<Permission, PermissionGrant>, PlatformError> {
        log::info!("simulated permission dialog for {:?}", permissions);
        tokio::time::sleep(self.dialog_delay()).await;

        let grant = self.script.grant_on_request;
        let mut state = lock(&self.state);
        Ok(permissions
            .into_iter()
            .map(|permission| {
                if grant {
                    state.granted.insert(permission);
                    (permission, PermissionGrant::Granted)
                } else {
                    (permission, PermissionGrant::Denied)
                }
            })
            .collect())
    }
}

#[async_trait]
impl HardwareEnablerPort for SimulatedPlatform {
    fn is_enabled(&self) -> Result<bool, PlatformError> {
        Ok(lock(&self.state).hardware_enabled)
    }

    async fn request_enable(&self) -> Result<EnableDecision, PlatformError> {
        log::info!("simulated hardware enable dialog");
        tokio::time::sleep(self.dialog_delay()).await;

        if self.script.accept_enable {
            lock(&self.state).hardware_enabled = true;
            Ok(EnableDecision::Accepted)
        } else {
            Ok(EnableDecision::Rejected)
        }
    }
}

impl ServiceStatusSourcePort for SimulatedPlatform {
    fn is_active(&self) -> Result<bool, PlatformError> {
        Ok(lock(&self.state).service_active)
    }

    fn register_listener(
        &self,
        listener: Arc<dyn ServiceStatusListener>,
    ) -> Result<(), PlatformError> {
        let mut state = lock(&self.state);
        if state.listener.is_some() {
            return Err(PlatformError::Registration(
                "listener already registered".to_string(),
            ));
        }
        state.listener = Some(listener);
        Ok(())
    }

    fn unregister_listener(&self) -> Result<(), PlatformError> {
        match lock(&self.state).listener.take() {
            Some(_) => Ok(()),
            None => Err(PlatformError::Registration(
                "listener not registered".to_string(),
            )),
        }
    }
}

impl HostSurfacePort for SimulatedPlatform {
    fn present_service_settings(&self) -> Result<(), PlatformError> {
        if !self.script.host_surface_available {
            return Err(PlatformError::HostUnavailable(
                "simulated host has no foreground surface".to_string(),
            ));
        }

        log::info!("simulated service settings presented");
        match self.script.service_activates_after_ms {
            Some(ms) => self.schedule_service_activation(Duration::from_millis(ms)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    struct ChannelListener(mpsc::UnboundedSender<Result<bool, PlatformError>>);

    impl ServiceStatusListener for ChannelListener {
        fn on_service_status_changed(&self, status: Result<bool, PlatformError>) {
            let _ = self.0.send(status);
        }
    }

    #[test]
    fn script_defaults_fill_missing_keys() {
        let script: SimulationScript = toml::from_str(
            r#"
            granted_permissions = ["bluetooth_scan"]
            accept_enable = false
            "#,
        )
        .unwrap();

        assert!(script.capability_supported);
        assert_eq!(script.granted_permissions, vec![Permission::BluetoothScan]);
        assert!(!script.accept_enable);
        assert_eq!(script.dialog_delay_ms, 200);
    }

    #[tokio::test(start_paused = true)]
    async fn granted_request_is_remembered() {
        let platform = SimulatedPlatform::new(SimulationScript::default());
        assert_eq!(
            platform.check(Permission::BluetoothConnect).unwrap(),
            PermissionGrant::Denied
        );

        platform
            .request(vec![Permission::BluetoothConnect])
            .await
            .unwrap();

        assert!(platform
            .check(Permission::BluetoothConnect)
            .unwrap()
            .is_granted());
    }

    #[tokio::test(start_paused = true)]
    async fn presenting_settings_activates_service_and_notifies() {
        let platform = SimulatedPlatform::new(SimulationScript {
            service_activates_after_ms: Some(1_000),
            ..SimulationScript::default()
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        platform
            .register_listener(Arc::new(ChannelListener(tx)))
            .unwrap();

        platform.present_service_settings().unwrap();

        assert_eq!(rx.recv().await, Some(Ok(true)));
        assert!(platform.is_active().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn first_notification_can_be_a_failure() {
        let platform = SimulatedPlatform::new(SimulationScript {
            listener_fails_once: true,
            ..SimulationScript::default()
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        platform
            .register_listener(Arc::new(ChannelListener(tx)))
            .unwrap();

        platform.present_service_settings().unwrap();

        assert!(matches!(rx.recv().await, Some(Err(PlatformError::QueryFailed(_)))));
    }

    #[test]
    fn double_registration_is_reported() {
        let platform = SimulatedPlatform::new(SimulationScript::default());
        let (tx, _rx) = mpsc::unbounded_channel();
        let listener: Arc<dyn ServiceStatusListener> = Arc::new(ChannelListener(tx));

        platform.register_listener(listener.clone()).unwrap();
        assert!(platform.register_listener(listener).is_err());
        platform.unregister_listener().unwrap();
        assert!(platform.unregister_listener().is_err());
    }

    #[test]
    fn missing_host_surface_is_an_error() {
        let platform = SimulatedPlatform::new(SimulationScript {
            host_surface_available: false,
            ..SimulationScript::default()
        });

        assert!(matches!(
            platform.present_service_settings(),
            Err(PlatformError::HostUnavailable(_))
        ));
    }
}
