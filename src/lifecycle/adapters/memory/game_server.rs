//! Simulated game server.

use crate::lifecycle::{
    domain::ServerEndpoint,
    ports::{
        ServerStatus, ServerSupervisor, StatusOracle, StatusOracleError, StatusOracleResult,
        SupervisorError, SupervisorResult,
    },
};
use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

/// In-memory game server acting as both supervisor and status oracle.
///
/// Starting the server makes it answer probes; stopping it makes probes
/// fail as unreachable. Tests steer player counts, inject failures and
/// slow down queries or stops through the setter methods.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGameServer {
    state: Arc<RwLock<GameServerState>>,
}

#[derive(Debug, Default)]
struct GameServerState {
    running: bool,
    players: u32,
    ping_ms: Option<u32>,
    version: Option<String>,
    silent_boot: bool,
    malformed: bool,
    start_failure: Option<String>,
    stop_failure: Option<String>,
    query_latency: Duration,
    stop_latency: Duration,
    start_calls: usize,
    stop_calls: usize,
}

impl InMemoryGameServer {
    /// Creates a stopped server.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a server that is already running, as if started elsewhere.
    #[must_use]
    pub fn running() -> Self {
        let server = Self::new();
        server.write_state().running = true;
        server
    }

    /// Sets the connected player count.
    pub fn set_players(&self, players: u32) {
        self.write_state().players = players;
    }

    /// Sets the details reported alongside the player count.
    pub fn set_details(&self, ping_ms: u32, version: impl Into<String>) {
        let mut state = self.write_state();
        state.ping_ms = Some(ping_ms);
        state.version = Some(version.into());
    }

    /// Makes the server crash or come back outside the supervisor.
    pub fn set_running(&self, running: bool) {
        self.write_state().running = running;
    }

    /// Makes successful starts leave the server unreachable.
    pub fn set_silent_boot(&self, silent: bool) {
        self.write_state().silent_boot = silent;
    }

    /// Makes probes return undecodable responses.
    pub fn set_malformed(&self, malformed: bool) {
        self.write_state().malformed = malformed;
    }

    /// Makes every start fail with `reason`.
    pub fn fail_starts(&self, reason: impl Into<String>) {
        self.write_state().start_failure = Some(reason.into());
    }

    /// Makes every stop fail with `reason`.
    pub fn fail_stops(&self, reason: impl Into<String>) {
        self.write_state().stop_failure = Some(reason.into());
    }

    /// Delays every query answer by `latency`.
    ///
    /// The answer reflects the server as it was when the query began.
    pub fn set_query_latency(&self, latency: Duration) {
        self.write_state().query_latency = latency;
    }

    /// Makes stops take `latency` before the server goes down.
    pub fn set_stop_latency(&self, latency: Duration) {
        self.write_state().stop_latency = latency;
    }

    /// Returns whether the server process is up.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.read_state().running
    }

    /// Returns how many times the supervisor start was invoked.
    #[must_use]
    pub fn start_calls(&self) -> usize {
        self.read_state().start_calls
    }

    /// Returns how many times the supervisor stop was invoked.
    #[must_use]
    pub fn stop_calls(&self) -> usize {
        self.read_state().stop_calls
    }

    fn read_state(&self) -> RwLockReadGuard<'_, GameServerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, GameServerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ServerSupervisor for InMemoryGameServer {
    async fn start(&self) -> SupervisorResult<()> {
        let mut state = self.write_state();
        state.start_calls += 1;
        if let Some(reason) = &state.start_failure {
            return Err(SupervisorError::failed("start", reason.clone()));
        }
        state.running = !state.silent_boot;
        Ok(())
    }

    async fn stop(&self) -> SupervisorResult<()> {
        let latency = {
            let mut state = self.write_state();
            state.stop_calls += 1;
            if let Some(reason) = &state.stop_failure {
                return Err(SupervisorError::failed("stop", reason.clone()));
            }
            state.stop_latency
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        let mut state = self.write_state();
        state.running = false;
        state.players = 0;
        Ok(())
    }
}

#[async_trait]
impl StatusOracle for InMemoryGameServer {
    async fn query(&self, _endpoint: &ServerEndpoint) -> StatusOracleResult<ServerStatus> {
        let (answer, latency) = {
            let state = self.read_state();
            (answer_from(&state), state.query_latency)
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        answer
    }
}

fn answer_from(state: &GameServerState) -> StatusOracleResult<ServerStatus> {
    if !state.running {
        return Err(StatusOracleError::Unreachable(
            "Failed all attempts".to_owned(),
        ));
    }
    if state.malformed {
        return Err(StatusOracleError::Malformed("unexpected token".to_owned()));
    }
    Ok(ServerStatus {
        players: state.players,
        ping_ms: state.ping_ms,
        version: state.version.clone(),
        ..ServerStatus::default()
    })
}
