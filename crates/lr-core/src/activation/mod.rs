//! Activation domain module.
//!
//! Defines the precondition-activation state machine, its error taxonomy and
//! the terminal callback surface exposed to consumers.

mod callback;
mod error;
mod request;
pub mod state_machine;

pub use callback::{ActivationCallback, ActivationOutcome};
pub use error::{ActivationError, ActivationStep};
pub use request::{ActivationRequest, RequestId};
pub use state_machine::{ActivationAction, ActivationEvent, ActivationState, ActivationStateMachine};
