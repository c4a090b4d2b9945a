//! Status oracle backed by the `gamedig` command-line tool.

use crate::lifecycle::{
    domain::ServerEndpoint,
    ports::{ServerStatus, StatusOracle, StatusOracleError, StatusOracleResult},
};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Stdio;
use tracing::debug;

/// Default query protocol for the managed game.
pub const DEFAULT_QUERY_TYPE: &str = "protocol-valve";

/// Runs `<program> --type <type> --host <host> --port <port>` and decodes
/// the JSON it prints.
///
/// A failed launch, a non-zero exit, or a JSON reply carrying an `error`
/// field means the server is unreachable. Output that is not the expected
/// JSON is reported as malformed.
#[derive(Debug, Clone)]
pub struct GamedigOracle {
    program: PathBuf,
    query_type: String,
}

impl GamedigOracle {
    /// Creates an oracle running `program` with the given query protocol.
    pub fn new(program: impl Into<PathBuf>, query_type: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            query_type: query_type.into(),
        }
    }
}

impl Default for GamedigOracle {
    fn default() -> Self {
        Self::new("gamedig", DEFAULT_QUERY_TYPE)
    }
}

#[derive(Debug, Deserialize)]
struct GamedigReply {
    #[serde(default)]
    numplayers: u32,
    #[serde(default)]
    ping: Option<u32>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    map: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Decodes one `gamedig` reply.
fn parse_reply(stdout: &[u8]) -> StatusOracleResult<ServerStatus> {
    let reply: GamedigReply = serde_json::from_slice(stdout)
        .map_err(|err| StatusOracleError::Malformed(err.to_string()))?;
    if let Some(error) = non_blank(reply.error) {
        return Err(StatusOracleError::Unreachable(error));
    }
    Ok(ServerStatus {
        players: reply.numplayers,
        ping_ms: reply.ping,
        version: non_blank(reply.version),
        name: non_blank(reply.name),
        map: non_blank(reply.map),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

#[async_trait]
impl StatusOracle for GamedigOracle {
    async fn query(&self, endpoint: &ServerEndpoint) -> StatusOracleResult<ServerStatus> {
        let output = tokio::process::Command::new(&self.program)
            .args(["--type", self.query_type.as_str()])
            .args(["--host", endpoint.host()])
            .args(["--port", endpoint.port()])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| StatusOracleError::Unreachable(err.to_string()))?;

        if !output.status.success() {
            debug!(status = %output.status, "status query exited unsuccessfully");
            return Err(StatusOracleError::Unreachable(
                "Failed all attempts".to_owned(),
            ));
        }
        parse_reply(&output.stdout)
    }
}
