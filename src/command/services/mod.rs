//! Command handling services.

mod dispatcher;

pub use dispatcher::{CommandDispatcher, DispatchOutcome};
