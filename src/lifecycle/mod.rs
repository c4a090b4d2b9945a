//! Game-server lifecycle monitoring.
//!
//! Periodic, unreliable status probes drive a closed state machine that
//! starts the server on request, waits for the first player, and stops the
//! server once it has stayed empty for long enough. Every transition is
//! applied by a single actor so the two timer loops and the one-shot start
//! task never race on shared state. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
