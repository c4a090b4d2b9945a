//! Status oracle port used to probe the game server.

use crate::lifecycle::domain::ServerEndpoint;
use async_trait::async_trait;
use thiserror::Error;

/// Result type for status queries.
pub type StatusOracleResult<T> = Result<T, StatusOracleError>;

/// Successful answer from the game server's query protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerStatus {
    /// Connected players.
    pub players: u32,
    /// Round-trip time in milliseconds.
    pub ping_ms: Option<u32>,
    /// Reported game version.
    pub version: Option<String>,
    /// Advertised server name.
    pub name: Option<String>,
    /// Currently loaded map.
    pub map: Option<String>,
}

impl ServerStatus {
    /// Creates a status with the given player count and no extra details.
    #[must_use]
    pub const fn with_players(players: u32) -> Self {
        Self {
            players,
            ping_ms: None,
            version: None,
            name: None,
            map: None,
        }
    }
}

/// Query contract of the game server's status endpoint.
#[async_trait]
pub trait StatusOracle: Send + Sync {
    /// Queries the server at `endpoint`.
    async fn query(&self, endpoint: &ServerEndpoint) -> StatusOracleResult<ServerStatus>;
}

/// Errors returned by status oracle adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusOracleError {
    /// The server did not answer.
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// The server answered with something that could not be decoded.
    #[error("malformed status response: {0}")]
    Malformed(String),
}
