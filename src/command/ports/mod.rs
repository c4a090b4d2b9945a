//! Port contracts for command registration, replies and start requests.

mod responder;
mod trigger;

pub use responder::{InteractionError, InteractionResponder, InteractionResult};
pub use trigger::{StartTrigger, StartTriggerError};
