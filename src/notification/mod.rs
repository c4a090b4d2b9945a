//! Notification slots and their backing message store.
//!
//! A slot is a logical, long-lived message (for example the status mirror)
//! that is created lazily and edited in place afterwards. The external
//! identifier of every slot is persisted so restarts keep editing the same
//! messages. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
