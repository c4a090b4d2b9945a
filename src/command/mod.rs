//! Chat commands that steer the monitor.
//!
//! Channel users start the server with a `/start` slash command. The
//! invocation is acknowledged straight away and the start request is queued
//! on the monitor, which announces the outcome itself. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
