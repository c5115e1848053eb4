//! Activation orchestrator
//!
//! Drives the precondition checks (capability, permissions, hardware enabled,
//! dependent service active) for one activation request at a time and delivers
//! exactly one terminal callback per request.
//!
//! # Architecture
//!
//! ```text
//! activate() / host resume / collaborator results / service notifications
//!   ↓  (serialized through the session lock)
//! ActivationStateMachine (pure state transitions)
//!   ↓
//! ActivationActions (executed by the orchestrator)
//!   ↓
//! Port calls, spawned async steps, terminal callback
//! ```
//!
//! Asynchronous steps run in spawned tasks and re-enter through the same lock
//! carrying a ticket; a result whose ticket no longer matches the pending step
//! was cancelled or superseded and is dropped.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use futures::future::{self, BoxFuture, FutureExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use lr_core::activation::{
    ActivationAction, ActivationCallback, ActivationError, ActivationEvent, ActivationOutcome,
    ActivationRequest, ActivationState, ActivationStateMachine, ActivationStep,
};
use lr_core::config::InFlightPolicy;
use lr_core::ports::{
    CapabilityProbePort, HardwareEnablerPort, HostSurfacePort, PermissionGatewayPort,
    PlatformError, ServiceStatusListener, ServiceStatusSourcePort,
};
use lr_core::Permission;

use super::context::{ActivationContext, ActivationSession, PendingStep};
use super::{ActivationOrchestratorConfig, ServiceStatusSubscriber};

/// Collaborators injected by whichever surface hosts the orchestrator.
#[derive(Clone)]
pub struct ActivationPorts {
    pub capability_probe: Arc<dyn CapabilityProbePort>,
    pub permission_gateway: Arc<dyn PermissionGatewayPort>,
    pub hardware_enabler: Arc<dyn HardwareEnablerPort>,
    pub service_status: Arc<dyn ServiceStatusSourcePort>,
    pub host_surface: Arc<dyn HostSurfacePort>,
}

/// Precondition-activation coordinator.
///
/// Cheap to clone; all clones share one session. Dropping the last clone tears
/// the session down: the pending step is cancelled, the subscription released,
/// and no callback is delivered.
#[derive(Clone)]
pub struct ActivationOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    config: ActivationOrchestratorConfig,
    context: ActivationContext,
    capability_probe: Arc<dyn CapabilityProbePort>,
    permission_gateway: Arc<dyn PermissionGatewayPort>,
    hardware_enabler: Arc<dyn HardwareEnablerPort>,
    host_surface: Arc<dyn HostSurfacePort>,
    subscriber: Arc<ServiceStatusSubscriber>,
}

impl ActivationOrchestrator {
    /// Create a new orchestrator.
    ///
    /// Must be called from within a Tokio runtime: a task forwarding service
    /// status notifications into the session is spawned here.
    pub fn new(config: ActivationOrchestratorConfig, ports: ActivationPorts) -> Self {
        let (status_tx, mut status_rx) = mpsc::unbounded_channel();
        let listener = Arc::new(ChannelListener { tx: status_tx });
        let subscriber = Arc::new(ServiceStatusSubscriber::new(ports.service_status, listener));

        info!(
            tier = %config.tier,
            policy = ?config.in_flight_policy,
            "activation orchestrator created"
        );

        let inner = Arc::new(Inner {
            config,
            context: ActivationContext::new(),
            capability_probe: ports.capability_probe,
            permission_gateway: ports.permission_gateway,
            hardware_enabler: ports.hardware_enabler,
            host_surface: ports.host_surface,
            subscriber,
        });

        let weak = Arc::downgrade(&inner);
        tokio::spawn(async move {
            while let Some(status) = status_rx.recv().await {
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                inner.handle_service_status(status).await;
            }
            debug!("service status pump stopped");
        });

        Self { inner }
    }

    /// Start (or restart) activation.
    ///
    /// When every prerequisite already holds, `on_ready` fires before this returns.
    pub async fn activate(&self, callback: Option<Arc<dyn ActivationCallback>>) {
        let request = ActivationRequest::new(callback);
        let span = info_span!("usecase.activation.activate", request_id = %request.id());
        async {
            let mut session = self.inner.context.lock().await;

            if let Some(in_flight) = session.request.as_ref().map(ActivationRequest::id) {
                match self.inner.config.in_flight_policy {
                    InFlightPolicy::Reject => {
                        warn!(%in_flight, "activation already in flight, rejecting new request");
                        request.complete(ActivationOutcome::Failed(ActivationError::AlreadyInFlight));
                        return;
                    }
                    InFlightPolicy::Supersede => {
                        if let Some(previous) = session.request.take() {
                            info!(previous = %previous.id(), "superseding in-flight activation");
                            previous.complete(ActivationOutcome::Failed(ActivationError::Superseded));
                        }
                    }
                }
            }

            session.request = Some(request);
            self.inner.dispatch(&mut session, ActivationEvent::Activate);
        }
        .instrument(span)
        .await
    }

    /// Resume hook: call when the hosting surface regains foreground focus.
    pub async fn on_host_resumed(&self) {
        let mut session = self.inner.context.lock().await;
        self.inner.dispatch(&mut session, ActivationEvent::HostResumed);
    }

    /// Abandon the in-flight request without delivering a callback.
    pub async fn teardown(&self) {
        let mut session = self.inner.context.lock().await;
        if let Some(request) = session.request.take() {
            info!(request_id = %request.id(), "activation torn down by caller");
        }
        self.inner.dispatch(&mut session, ActivationEvent::Teardown);
    }

    pub async fn state(&self) -> ActivationState {
        self.inner.context.lock().await.state.clone()
    }

    pub async fn is_pending(&self) -> bool {
        self.inner.context.lock().await.request.is_some()
    }

    pub fn config(&self) -> &ActivationOrchestratorConfig {
        &self.inner.config
    }
}

impl Inner {
    fn dispatch(self: &Arc<Self>, session: &mut ActivationSession, event: ActivationEvent) {
        let request_id = session
            .request
            .as_ref()
            .map(|request| request.id().to_string())
            .unwrap_or_default();
        let _span = info_span!("usecase.activation.dispatch", request_id = %request_id).entered();
        let mut pending_events = VecDeque::from([event]);

        while let Some(event) = pending_events.pop_front() {
            let from = session.state.clone();
            let event_name = format!("{:?}", event);
            let (next, actions) = ActivationStateMachine::transition(from.clone(), event);
            if from != next {
                info!(from = ?from, to = ?next, event = %event_name, "activation state transition");
            } else {
                debug!(state = ?next, event = %event_name, "activation event handled");
            }
            session.state = next;

            for action in actions {
                debug!(?action, "activation executing action");
                if let Some(follow_up) = self.execute_action(session, action) {
                    pending_events.push_back(follow_up);
                }
            }
        }
    }

    fn execute_action(
        self: &Arc<Self>,
        session: &mut ActivationSession,
        action: ActivationAction,
    ) -> Option<ActivationEvent> {
        match action {
            ActivationAction::CheckCapability => Some(ActivationEvent::CapabilityChecked {
                supported: self.capability_probe.is_supported(),
            }),
            ActivationAction::CheckPermissions => Some(match self.missing_permissions() {
                Ok(missing) => ActivationEvent::PermissionsChecked { missing },
                Err(err) => step_failed(ActivationStep::Permissions, err),
            }),
            ActivationAction::RequestPermissions { permissions } => {
                let gateway = self.permission_gateway.clone();
                let work = async move {
                    let requested = permissions.clone();
                    match gateway.request(permissions).await {
                        Ok(results) => ActivationEvent::PermissionsResolved {
                            denied: requested
                                .into_iter()
                                .filter(|p| !results.get(p).is_some_and(|g| g.is_granted()))
                                .collect(),
                        },
                        Err(err) => step_failed(ActivationStep::Permissions, err),
                    }
                };
                self.spawn_step(session, ActivationStep::Permissions, work.boxed());
                None
            }
            ActivationAction::CheckHardware => Some(match self.hardware_enabler.is_enabled() {
                Ok(enabled) => ActivationEvent::HardwareChecked { enabled },
                Err(err) => step_failed(ActivationStep::HardwareEnable, err),
            }),
            ActivationAction::RequestHardwareEnable => {
                let enabler = self.hardware_enabler.clone();
                let work = async move {
                    match enabler.request_enable().await {
                        Ok(decision) => ActivationEvent::HardwareEnableResolved {
                            accepted: decision.is_accepted(),
                        },
                        Err(err) => step_failed(ActivationStep::HardwareEnable, err),
                    }
                };
                self.spawn_step(session, ActivationStep::HardwareEnable, work.boxed());
                None
            }
            ActivationAction::CheckService => Some(match self.subscriber.is_service_active() {
                Ok(active) => ActivationEvent::ServiceChecked { active },
                Err(err) => step_failed(ActivationStep::ServiceActive, err),
            }),
            ActivationAction::SubscribeServiceStatus => {
                if let Some(stale) = session.subscription.take() {
                    stale.release();
                }
                let handle = self.subscriber.subscribe();
                let live = handle.is_live();
                session.subscription = Some(handle);
                if live {
                    None
                } else {
                    Some(ActivationEvent::ListenerDegraded {
                        reason: "service status registration failed".to_string(),
                    })
                }
            }
            ActivationAction::PresentServiceSettings => {
                match self.host_surface.present_service_settings() {
                    Ok(()) => None,
                    Err(err) => Some(step_failed(ActivationStep::ServiceActive, err)),
                }
            }
            ActivationAction::AwaitServiceActive => {
                self.spawn_step(
                    session,
                    ActivationStep::ServiceActive,
                    future::pending::<ActivationEvent>().boxed(),
                );
                None
            }
            ActivationAction::ReleaseSubscription { force } => {
                match session.subscription.take() {
                    Some(handle) if force => handle.force_release(),
                    Some(handle) => handle.release(),
                    None if force => self.subscriber.force_unregister(),
                    None => {}
                }
                None
            }
            ActivationAction::CancelPendingStep => {
                if let Some(pending) = session.pending.take() {
                    debug!(step = %pending.step, ticket = pending.ticket, "cancelling pending step");
                }
                None
            }
            ActivationAction::Deliver(outcome) => {
                match session.request.take() {
                    Some(request) => request.complete(outcome),
                    None => debug!(outcome = outcome.kind(), "no pending request for outcome"),
                }
                None
            }
        }
    }

    fn missing_permissions(&self) -> Result<Vec<Permission>, PlatformError> {
        let mut missing = Vec::new();
        for &permission in self.config.tier.required_permissions() {
            if !self.permission_gateway.check(permission)?.is_granted() {
                missing.push(permission);
            }
        }
        Ok(missing)
    }

    /// Run `work` off the session lock, bounded by the step timeout and cancelled
    /// when the returned pending step is dropped.
    fn spawn_step(
        self: &Arc<Self>,
        session: &mut ActivationSession,
        step: ActivationStep,
        work: BoxFuture<'static, ActivationEvent>,
    ) {
        let ticket = session.next_ticket();
        let timeout = self.config.timeout_for(step);
        let cancel = CancellationToken::new();
        let cancelled = cancel.clone();
        let weak: Weak<Inner> = Arc::downgrade(self);

        tokio::spawn(async move {
            let event = tokio::select! {
                biased;
                _ = cancelled.cancelled() => return,
                result = tokio::time::timeout(timeout, work) => match result {
                    Ok(event) => event,
                    Err(_) => {
                        warn!(%step, timeout_secs = timeout.as_secs(), "activation step timed out");
                        ActivationEvent::StepFailed {
                            error: ActivationError::StepTimedOut { step },
                        }
                    }
                },
            };

            if let Some(inner) = weak.upgrade() {
                inner.resume_step(ticket, event).await;
            }
        });

        debug!(%step, ticket, "activation suspended on async step");
        session.pending = Some(PendingStep::new(ticket, step, cancel));
    }

    async fn resume_step(self: &Arc<Self>, ticket: u64, event: ActivationEvent) {
        let mut session = self.context.lock().await;
        let Some(pending) = session.take_pending(ticket) else {
            debug!(ticket, "ignoring result of a cancelled step");
            return;
        };
        debug!(step = %pending.step, ticket, "activation resumed");
        drop(pending);
        self.dispatch(&mut session, event);
    }

    async fn handle_service_status(self: &Arc<Self>, status: Result<bool, PlatformError>) {
        let mut session = self.context.lock().await;
        if session.request.is_none() {
            debug!(?status, "service status change with no pending request");
            return;
        }

        let event = match status {
            Ok(active) => ActivationEvent::ServiceStatusChanged { active },
            Err(err) => {
                let failure = ActivationError::TransientSubscriptionFailure {
                    reason: err.to_string(),
                };
                warn!(error = %failure, "service status listener degraded");
                ActivationEvent::ListenerDegraded {
                    reason: err.to_string(),
                }
            }
        };
        self.dispatch(&mut session, event);
    }
}

fn step_failed(step: ActivationStep, err: PlatformError) -> ActivationEvent {
    let error = ActivationError::orchestration(step, &err);
    warn!(%step, error = %err, "activation step failed");
    ActivationEvent::StepFailed { error }
}

/// Forwards platform notifications (from any thread) into the orchestrator.
struct ChannelListener {
    tx: mpsc::UnboundedSender<Result<bool, PlatformError>>,
}

impl ServiceStatusListener for ChannelListener {
    fn on_service_status_changed(&self, status: Result<bool, PlatformError>) {
        if self.tx.send(status).is_err() {
            debug!("orchestrator gone, dropping service status notification");
        }
    }
}
