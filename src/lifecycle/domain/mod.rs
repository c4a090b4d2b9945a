//! Domain model for the server lifecycle.
//!
//! [`LifecycleMachine`] is pure: it consumes events and returns the
//! [`Effect`]s the caller must perform. It never touches the network, the
//! filesystem, or a timer.

mod effect;
mod endpoint;
mod error;
mod machine;
mod phase;
mod policy;
mod snapshot;

pub use effect::{Effect, Notice, StartupBanner, StartupView};
pub use endpoint::ServerEndpoint;
pub use error::LifecycleDomainError;
pub use machine::LifecycleMachine;
pub use phase::LifecyclePhase;
pub use policy::AutoStopPolicy;
pub use snapshot::{ProbeErrorKind, ServerSnapshot};
