//! Fail-closed wrapper around the status oracle.

use crate::lifecycle::{
    domain::{ServerEndpoint, ServerSnapshot},
    ports::{StatusOracle, StatusOracleError},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Time-bounded status probe for one server endpoint.
///
/// [`query`](Self::query) never fails: oracle errors and timeouts are folded
/// into the returned [`ServerSnapshot`].
pub struct StatusProbe<O>
where
    O: StatusOracle,
{
    oracle: Arc<O>,
    endpoint: ServerEndpoint,
    timeout: Duration,
}

impl<O> Clone for StatusProbe<O>
where
    O: StatusOracle,
{
    fn clone(&self) -> Self {
        Self {
            oracle: Arc::clone(&self.oracle),
            endpoint: self.endpoint.clone(),
            timeout: self.timeout,
        }
    }
}

impl<O> StatusProbe<O>
where
    O: StatusOracle,
{
    /// Creates a probe for `endpoint` bounded by `timeout`.
    #[must_use]
    pub const fn new(oracle: Arc<O>, endpoint: ServerEndpoint, timeout: Duration) -> Self {
        Self {
            oracle,
            endpoint,
            timeout,
        }
    }

    /// Queries the server once.
    pub async fn query(&self) -> ServerSnapshot {
        let outcome = tokio::time::timeout(self.timeout, self.oracle.query(&self.endpoint)).await;
        let snapshot = match outcome {
            Err(_elapsed) => ServerSnapshot::unreachable(format!(
                "no answer within {}s",
                self.timeout.as_secs()
            )),
            Ok(Err(StatusOracleError::Unreachable(detail))) => ServerSnapshot::unreachable(detail),
            Ok(Err(StatusOracleError::Malformed(detail))) => ServerSnapshot::parse_failure(detail),
            Ok(Ok(status)) => {
                let mut snapshot = ServerSnapshot::online(status.players);
                if let Some(ping_ms) = status.ping_ms {
                    snapshot = snapshot.with_ping(ping_ms);
                }
                if let Some(version) = status.version {
                    snapshot = snapshot.with_version(version);
                }
                snapshot
            }
        };
        debug!(
            players = snapshot.player_count(),
            error = ?snapshot.error_kind(),
            "probed server"
        );
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::domain::ProbeErrorKind;
    use crate::lifecycle::ports::{ServerStatus, StatusOracleResult};
    use async_trait::async_trait;
    use mockall::mock;
    use rstest::rstest;

    mock! {
        Oracle {}

        #[async_trait]
        impl StatusOracle for Oracle {
            async fn query(&self, endpoint: &ServerEndpoint) -> StatusOracleResult<ServerStatus>;
        }
    }

    struct HangingOracle;

    #[async_trait]
    impl StatusOracle for HangingOracle {
        async fn query(&self, _endpoint: &ServerEndpoint) -> StatusOracleResult<ServerStatus> {
            std::future::pending().await
        }
    }

    fn endpoint() -> ServerEndpoint {
        ServerEndpoint::new("127.0.0.1", "26900").expect("endpoint should be valid")
    }

    fn probe_with(oracle: MockOracle) -> StatusProbe<MockOracle> {
        StatusProbe::new(Arc::new(oracle), endpoint(), Duration::from_secs(10))
    }

    #[tokio::test]
    async fn successful_query_carries_details() {
        let mut oracle = MockOracle::new();
        oracle.expect_query().times(1).returning(|_| {
            Ok(ServerStatus {
                players: 2,
                ping_ms: Some(31),
                version: Some("V 1.0".to_owned()),
                ..ServerStatus::default()
            })
        });

        let snapshot = probe_with(oracle).query().await;

        assert_eq!(
            snapshot,
            ServerSnapshot::online(2).with_ping(31).with_version("V 1.0")
        );
    }

    #[rstest]
    #[case(StatusOracleError::Unreachable("refused".to_owned()), ProbeErrorKind::Unreachable)]
    #[case(StatusOracleError::Malformed("eof".to_owned()), ProbeErrorKind::ParseFailure)]
    #[tokio::test]
    async fn oracle_errors_fold_into_snapshot(
        #[case] error: StatusOracleError,
        #[case] expected: ProbeErrorKind,
    ) {
        let mut oracle = MockOracle::new();
        oracle
            .expect_query()
            .times(1)
            .returning(move |_| Err(error.clone()));

        let snapshot = probe_with(oracle).query().await;

        assert_eq!(snapshot.error_kind(), expected);
        assert_eq!(snapshot.player_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_oracle_times_out_as_unreachable() {
        let probe = StatusProbe::new(Arc::new(HangingOracle), endpoint(), Duration::from_secs(10));

        let snapshot = probe.query().await;

        assert_eq!(snapshot.error_kind(), ProbeErrorKind::Unreachable);
    }
}
