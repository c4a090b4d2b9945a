//! Warden: lifecycle monitor for a dedicated game server.
//!
//! Warden starts the server on request, mirrors its status into a chat
//! channel, waits for the first player, and stops the server again once it
//! has stayed empty for long enough.
//!
//! # Architecture
//!
//! Warden follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (processes, REST, gateway, files)
//!
//! # Modules
//!
//! - [`lifecycle`]: Server state machine, probes, and the monitor actor
//! - [`notification`]: Named message slots and their persistence
//! - [`command`]: Slash commands that request a server start
//! - [`config`]: Command-line and environment settings
//! - [`observability`]: Logging setup

pub mod command;
pub mod config;
pub mod lifecycle;
pub mod notification;
pub mod observability;
