//! Normalised result of one status probe.

/// Why a probe did not produce a usable status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeErrorKind {
    /// The probe succeeded.
    None,
    /// The server did not answer, or the query timed out.
    Unreachable,
    /// The server answered with something that could not be decoded.
    ParseFailure,
}

/// Immutable result of a single status probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSnapshot {
    player_count: u32,
    online: bool,
    error_kind: ProbeErrorKind,
    ping_ms: Option<u32>,
    version: Option<String>,
    detail: Option<String>,
}

impl ServerSnapshot {
    /// Creates a successful snapshot.
    #[must_use]
    pub const fn online(player_count: u32) -> Self {
        Self {
            player_count,
            online: true,
            error_kind: ProbeErrorKind::None,
            ping_ms: None,
            version: None,
            detail: None,
        }
    }

    /// Creates a snapshot for a server that could not be reached.
    #[must_use]
    pub fn unreachable(detail: impl Into<String>) -> Self {
        Self::failed(ProbeErrorKind::Unreachable, detail.into())
    }

    /// Creates a snapshot for a response that could not be decoded.
    #[must_use]
    pub fn parse_failure(detail: impl Into<String>) -> Self {
        Self::failed(ProbeErrorKind::ParseFailure, detail.into())
    }

    const fn failed(error_kind: ProbeErrorKind, detail: String) -> Self {
        Self {
            player_count: 0,
            online: false,
            error_kind,
            ping_ms: None,
            version: None,
            detail: Some(detail),
        }
    }

    /// Adds the measured round-trip time.
    #[must_use]
    pub const fn with_ping(mut self, ping_ms: u32) -> Self {
        self.ping_ms = Some(ping_ms);
        self
    }

    /// Adds the reported server version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Returns the number of connected players.
    #[must_use]
    pub const fn player_count(&self) -> u32 {
        self.player_count
    }

    /// Returns whether the server answered the probe.
    #[must_use]
    pub const fn is_online(&self) -> bool {
        self.online
    }

    /// Returns the probe error classification.
    #[must_use]
    pub const fn error_kind(&self) -> ProbeErrorKind {
        self.error_kind
    }

    /// Returns whether the probe failed.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        !matches!(self.error_kind, ProbeErrorKind::None)
    }

    /// Returns the measured round-trip time.
    #[must_use]
    pub const fn ping_ms(&self) -> Option<u32> {
        self.ping_ms
    }

    /// Returns the reported server version.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the failure detail, if the probe failed.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}
