//! Adapter implementations for lifecycle ports.

pub mod memory;

mod clock;
mod gamedig;
mod process;

pub use clock::MonotonicClock;
pub use gamedig::{DEFAULT_QUERY_TYPE, GamedigOracle};
pub use process::ShellSupervisor;
