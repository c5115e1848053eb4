//! Activation state machine.
//!
//! Defines a pure state transition function for the precondition-activation
//! flow. Every positive resume (permissions granted, hardware enabled, service
//! turned on, degraded listener repaired) restarts the sequence from the
//! capability check, so a prerequisite that became false while another step was
//! pending is always caught.

use serde::{Deserialize, Serialize};

use super::{ActivationError, ActivationOutcome};
use crate::permission::Permission;

/// Activation flow state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationState {
    /// No request is being processed.
    Idle,
    /// Querying whether the hardware capability exists.
    CheckingCapability,
    /// Checking grants, or waiting for the permission dialog result.
    RequestingPermissions,
    /// Checking the radio, or waiting for the enable dialog result.
    RequestingHardwareEnable,
    /// Checking the dependent service, or waiting for it to turn on.
    AwaitingServiceActive {
        /// Set when the status listener failed; repaired on the next host resume.
        listener_degraded: bool,
    },
    /// All prerequisites satisfied.
    Completed,
    /// The request ended without readiness.
    Failed { error: ActivationError },
}

impl ActivationState {
    /// Whether the state belongs to a request that has not reached a terminal outcome.
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            ActivationState::CheckingCapability
                | ActivationState::RequestingPermissions
                | ActivationState::RequestingHardwareEnable
                | ActivationState::AwaitingServiceActive { .. }
        )
    }
}

/// Events that drive the activation flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationEvent {
    /// A consumer called `activate()`.
    Activate,

    // Synchronous check results
    CapabilityChecked { supported: bool },
    PermissionsChecked { missing: Vec<Permission> },
    HardwareChecked { enabled: bool },
    ServiceChecked { active: bool },

    // Asynchronous results (from collaborators)
    PermissionsResolved { denied: Vec<Permission> },
    HardwareEnableResolved { accepted: bool },
    ServiceStatusChanged { active: bool },
    ListenerDegraded { reason: String },

    // Control
    HostResumed,
    StepFailed { error: ActivationError },
    Teardown,
}

/// Side-effects produced by state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationAction {
    CheckCapability,
    CheckPermissions,
    RequestPermissions { permissions: Vec<Permission> },
    CheckHardware,
    RequestHardwareEnable,
    CheckService,
    SubscribeServiceStatus,
    PresentServiceSettings,
    /// Arm the wait for the dependent service (timeout only, no collaborator call).
    AwaitServiceActive,
    /// Drop the service status subscription; `force` also unregisters at the platform.
    ReleaseSubscription { force: bool },
    /// Cancel whatever asynchronous step is outstanding.
    CancelPendingStep,
    /// Deliver the terminal outcome to the pending request.
    Deliver(ActivationOutcome),
}

/// Pure activation state machine.
///
/// Contains no side effects; the orchestrator executes the returned actions.
pub struct ActivationStateMachine;

impl ActivationStateMachine {
    pub fn transition(
        state: ActivationState,
        event: ActivationEvent,
    ) -> (ActivationState, Vec<ActivationAction>) {
        use ActivationAction as A;
        use ActivationEvent as E;
        use ActivationState as S;

        match (state, event) {
            (state, E::Activate) => {
                let mut actions = Vec::new();
                if state.is_in_progress() {
                    actions.push(A::CancelPendingStep);
                    actions.push(A::ReleaseSubscription { force: false });
                }
                actions.push(A::CheckCapability);
                (S::CheckingCapability, actions)
            }

            // Step 1: capability
            (S::CheckingCapability, E::CapabilityChecked { supported: false }) => fail(
                ActivationError::UnsupportedCapability,
                Vec::new(),
            ),
            (S::CheckingCapability, E::CapabilityChecked { supported: true }) => {
                (S::RequestingPermissions, vec![A::CheckPermissions])
            }

            // Step 2: permissions
            (S::RequestingPermissions, E::PermissionsChecked { missing }) => {
                if missing.is_empty() {
                    (S::RequestingHardwareEnable, vec![A::CheckHardware])
                } else {
                    (
                        S::RequestingPermissions,
                        vec![A::RequestPermissions {
                            permissions: missing,
                        }],
                    )
                }
            }
            (S::RequestingPermissions, E::PermissionsResolved { denied }) => {
                if denied.is_empty() {
                    restart(Vec::new())
                } else {
                    fail(
                        ActivationError::PermissionDenied {
                            permissions: denied,
                        },
                        Vec::new(),
                    )
                }
            }

            // Step 3: hardware
            (S::RequestingHardwareEnable, E::HardwareChecked { enabled: true }) => (
                S::AwaitingServiceActive {
                    listener_degraded: false,
                },
                vec![A::CheckService],
            ),
            (S::RequestingHardwareEnable, E::HardwareChecked { enabled: false }) => {
                (S::RequestingHardwareEnable, vec![A::RequestHardwareEnable])
            }
            (S::RequestingHardwareEnable, E::HardwareEnableResolved { accepted: true }) => {
                restart(Vec::new())
            }
            (S::RequestingHardwareEnable, E::HardwareEnableResolved { accepted: false }) => {
                fail(ActivationError::HardwareEnableRejected, Vec::new())
            }

            // Step 4: dependent service
            (S::AwaitingServiceActive { .. }, E::ServiceChecked { active: true }) => {
                (S::Completed, vec![A::Deliver(ActivationOutcome::Ready)])
            }
            (S::AwaitingServiceActive { listener_degraded }, E::ServiceChecked { active: false }) => (
                S::AwaitingServiceActive { listener_degraded },
                vec![
                    A::SubscribeServiceStatus,
                    A::PresentServiceSettings,
                    A::AwaitServiceActive,
                ],
            ),
            (S::AwaitingServiceActive { .. }, E::ServiceStatusChanged { active: true }) => {
                restart(vec![
                    A::CancelPendingStep,
                    A::ReleaseSubscription { force: false },
                ])
            }
            (
                S::AwaitingServiceActive { listener_degraded },
                E::ServiceStatusChanged { active: false },
            ) => (S::AwaitingServiceActive { listener_degraded }, Vec::new()),
            (S::AwaitingServiceActive { .. }, E::ListenerDegraded { .. }) => (
                S::AwaitingServiceActive {
                    listener_degraded: true,
                },
                Vec::new(),
            ),
            (
                S::AwaitingServiceActive {
                    listener_degraded: true,
                },
                E::HostResumed,
            ) => restart(vec![
                A::CancelPendingStep,
                A::ReleaseSubscription { force: true },
            ]),

            // Failures and teardown
            (state, E::StepFailed { error }) if state.is_in_progress() => fail(
                error,
                vec![
                    A::CancelPendingStep,
                    A::ReleaseSubscription { force: false },
                ],
            ),
            (state, E::Teardown) => {
                let actions = if state.is_in_progress() {
                    vec![
                        A::CancelPendingStep,
                        A::ReleaseSubscription { force: false },
                    ]
                } else {
                    Vec::new()
                };
                (S::Idle, actions)
            }

            (state, _event) => (state, Vec::new()),
        }
    }
}

fn restart(mut prefix: Vec<ActivationAction>) -> (ActivationState, Vec<ActivationAction>) {
    prefix.push(ActivationAction::CheckCapability);
    (ActivationState::CheckingCapability, prefix)
}

fn fail(
    error: ActivationError,
    mut prefix: Vec<ActivationAction>,
) -> (ActivationState, Vec<ActivationAction>) {
    prefix.push(ActivationAction::Deliver(ActivationOutcome::from(
        error.clone(),
    )));
    (ActivationState::Failed { error }, prefix)
}

#[cfg(test)]
mod tests {
    use super::{ActivationAction, ActivationEvent, ActivationState, ActivationStateMachine};
    use crate::activation::{ActivationError, ActivationOutcome, ActivationStep};
    use crate::permission::Permission;

    fn awaiting(listener_degraded: bool) -> ActivationState {
        ActivationState::AwaitingServiceActive { listener_degraded }
    }

    #[test]
    fn activate_from_idle_checks_capability_first() {
        let (next, actions) =
            ActivationStateMachine::transition(ActivationState::Idle, ActivationEvent::Activate);
        assert_eq!(next, ActivationState::CheckingCapability);
        assert_eq!(actions, vec![ActivationAction::CheckCapability]);
    }

    #[test]
    fn activate_while_in_progress_cancels_and_releases_before_restart() {
        let (next, actions) =
            ActivationStateMachine::transition(awaiting(false), ActivationEvent::Activate);
        assert_eq!(next, ActivationState::CheckingCapability);
        assert_eq!(
            actions,
            vec![
                ActivationAction::CancelPendingStep,
                ActivationAction::ReleaseSubscription { force: false },
                ActivationAction::CheckCapability,
            ]
        );
    }

    #[test]
    fn unsupported_capability_delivers_unsupported_without_other_actions() {
        let (next, actions) = ActivationStateMachine::transition(
            ActivationState::CheckingCapability,
            ActivationEvent::CapabilityChecked { supported: false },
        );
        assert_eq!(
            next,
            ActivationState::Failed {
                error: ActivationError::UnsupportedCapability
            }
        );
        assert_eq!(
            actions,
            vec![ActivationAction::Deliver(ActivationOutcome::Unsupported)]
        );
    }

    #[test]
    fn missing_permissions_are_requested() {
        let (next, actions) = ActivationStateMachine::transition(
            ActivationState::RequestingPermissions,
            ActivationEvent::PermissionsChecked {
                missing: vec![Permission::BluetoothConnect],
            },
        );
        assert_eq!(next, ActivationState::RequestingPermissions);
        assert_eq!(
            actions,
            vec![ActivationAction::RequestPermissions {
                permissions: vec![Permission::BluetoothConnect],
            }]
        );
    }

    #[test]
    fn granted_permissions_restart_from_capability() {
        let (next, actions) = ActivationStateMachine::transition(
            ActivationState::RequestingPermissions,
            ActivationEvent::PermissionsResolved { denied: vec![] },
        );
        assert_eq!(next, ActivationState::CheckingCapability);
        assert_eq!(actions, vec![ActivationAction::CheckCapability]);
    }

    #[test]
    fn denied_permission_is_rejected() {
        let (next, actions) = ActivationStateMachine::transition(
            ActivationState::RequestingPermissions,
            ActivationEvent::PermissionsResolved {
                denied: vec![Permission::AccessFineLocation],
            },
        );
        let error = ActivationError::PermissionDenied {
            permissions: vec![Permission::AccessFineLocation],
        };
        assert_eq!(next, ActivationState::Failed { error: error.clone() });
        assert_eq!(
            actions,
            vec![ActivationAction::Deliver(ActivationOutcome::Rejected(error))]
        );
    }

    #[test]
    fn disabled_hardware_is_requested_and_rejection_is_terminal() {
        let (next, actions) = ActivationStateMachine::transition(
            ActivationState::RequestingHardwareEnable,
            ActivationEvent::HardwareChecked { enabled: false },
        );
        assert_eq!(next, ActivationState::RequestingHardwareEnable);
        assert_eq!(actions, vec![ActivationAction::RequestHardwareEnable]);

        let (next, actions) = ActivationStateMachine::transition(
            next,
            ActivationEvent::HardwareEnableResolved { accepted: false },
        );
        assert!(matches!(next, ActivationState::Failed { .. }));
        assert_eq!(
            actions,
            vec![ActivationAction::Deliver(ActivationOutcome::Rejected(
                ActivationError::HardwareEnableRejected
            ))]
        );
    }

    #[test]
    fn inactive_service_subscribes_presents_and_waits() {
        let (next, actions) = ActivationStateMachine::transition(
            awaiting(false),
            ActivationEvent::ServiceChecked { active: false },
        );
        assert_eq!(next, awaiting(false));
        assert_eq!(
            actions,
            vec![
                ActivationAction::SubscribeServiceStatus,
                ActivationAction::PresentServiceSettings,
                ActivationAction::AwaitServiceActive,
            ]
        );
    }

    #[test]
    fn service_turning_on_releases_then_restarts() {
        let (next, actions) = ActivationStateMachine::transition(
            awaiting(false),
            ActivationEvent::ServiceStatusChanged { active: true },
        );
        assert_eq!(next, ActivationState::CheckingCapability);
        assert_eq!(
            actions,
            vec![
                ActivationAction::CancelPendingStep,
                ActivationAction::ReleaseSubscription { force: false },
                ActivationAction::CheckCapability,
            ]
        );
    }

    #[test]
    fn service_still_off_keeps_waiting() {
        let (next, actions) = ActivationStateMachine::transition(
            awaiting(false),
            ActivationEvent::ServiceStatusChanged { active: false },
        );
        assert_eq!(next, awaiting(false));
        assert!(actions.is_empty());
    }

    #[test]
    fn host_resume_only_repairs_a_degraded_listener() {
        let (next, actions) =
            ActivationStateMachine::transition(awaiting(false), ActivationEvent::HostResumed);
        assert_eq!(next, awaiting(false));
        assert!(actions.is_empty());

        let (degraded, _) = ActivationStateMachine::transition(
            awaiting(false),
            ActivationEvent::ListenerDegraded {
                reason: "status read failed".into(),
            },
        );
        assert_eq!(degraded, awaiting(true));

        let (next, actions) =
            ActivationStateMachine::transition(degraded, ActivationEvent::HostResumed);
        assert_eq!(next, ActivationState::CheckingCapability);
        assert_eq!(
            actions,
            vec![
                ActivationAction::CancelPendingStep,
                ActivationAction::ReleaseSubscription { force: true },
                ActivationAction::CheckCapability,
            ]
        );
    }

    #[test]
    fn step_failure_releases_and_delivers_failed() {
        let error = ActivationError::StepTimedOut {
            step: ActivationStep::ServiceActive,
        };
        let (next, actions) = ActivationStateMachine::transition(
            awaiting(false),
            ActivationEvent::StepFailed {
                error: error.clone(),
            },
        );
        assert_eq!(next, ActivationState::Failed { error: error.clone() });
        assert_eq!(
            actions,
            vec![
                ActivationAction::CancelPendingStep,
                ActivationAction::ReleaseSubscription { force: false },
                ActivationAction::Deliver(ActivationOutcome::Failed(error)),
            ]
        );
    }

    #[test]
    fn late_events_after_terminal_state_are_ignored() {
        let (next, actions) = ActivationStateMachine::transition(
            ActivationState::Completed,
            ActivationEvent::PermissionsResolved { denied: vec![] },
        );
        assert_eq!(next, ActivationState::Completed);
        assert!(actions.is_empty());

        let (next, actions) = ActivationStateMachine::transition(
            ActivationState::Completed,
            ActivationEvent::StepFailed {
                error: ActivationError::HardwareEnableRejected,
            },
        );
        assert_eq!(next, ActivationState::Completed);
        assert!(actions.is_empty());
    }

    #[test]
    fn teardown_returns_to_idle_without_delivering() {
        let (next, actions) = ActivationStateMachine::transition(
            ActivationState::RequestingHardwareEnable,
            ActivationEvent::Teardown,
        );
        assert_eq!(next, ActivationState::Idle);
        assert!(!actions
            .iter()
            .any(|action| matches!(action, ActivationAction::Deliver(_))));
    }
}
