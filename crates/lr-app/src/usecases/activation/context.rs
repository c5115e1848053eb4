use std::fmt;

use lr_core::activation::{ActivationRequest, ActivationState, ActivationStep};
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::{CancellationToken, DropGuard};

use super::SubscriptionHandle;

/// Everything a single activation request owns.
///
/// Only ever touched while holding the [`ActivationContext`] lock, which is the
/// orchestrator's single execution context.
#[derive(Debug)]
pub(crate) struct ActivationSession {
    pub(crate) state: ActivationState,
    /// `Some` while a request is pending.
    pub(crate) request: Option<ActivationRequest>,
    /// Held only while waiting for the dependent service.
    pub(crate) subscription: Option<SubscriptionHandle>,
    /// The outstanding asynchronous step, if any.
    pub(crate) pending: Option<PendingStep>,
    next_ticket: u64,
}

impl ActivationSession {
    fn new() -> Self {
        Self {
            state: ActivationState::Idle,
            request: None,
            subscription: None,
            pending: None,
            next_ticket: 0,
        }
    }

    pub(crate) fn next_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    /// Take the pending step if `ticket` still identifies it.
    pub(crate) fn take_pending(&mut self, ticket: u64) -> Option<PendingStep> {
        if self.pending.as_ref().is_some_and(|p| p.ticket == ticket) {
            self.pending.take()
        } else {
            None
        }
    }
}

/// An asynchronous step in flight. Dropping it cancels the step.
pub(crate) struct PendingStep {
    pub(crate) ticket: u64,
    pub(crate) step: ActivationStep,
    _cancel_on_drop: DropGuard,
}

impl PendingStep {
    pub(crate) fn new(ticket: u64, step: ActivationStep, cancel: CancellationToken) -> Self {
        Self {
            ticket,
            step,
            _cancel_on_drop: cancel.drop_guard(),
        }
    }
}

impl fmt::Debug for PendingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingStep")
            .field("ticket", &self.ticket)
            .field("step", &self.step)
            .finish()
    }
}

/// Shared activation context serializing every state transition.
pub(crate) struct ActivationContext {
    session: Mutex<ActivationSession>,
}

impl ActivationContext {
    pub(crate) fn new() -> Self {
        Self {
            session: Mutex::new(ActivationSession::new()),
        }
    }

    /// Acquire the session. Transitions run entirely while the guard is held.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, ActivationSession> {
        self.session.lock().await
    }
}
