//! Port contracts for process supervision and status queries.

mod oracle;
mod supervisor;

pub use oracle::{ServerStatus, StatusOracle, StatusOracleError, StatusOracleResult};
pub use supervisor::{ServerSupervisor, SupervisorError, SupervisorResult};
