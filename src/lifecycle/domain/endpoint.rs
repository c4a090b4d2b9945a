//! Connection details of the managed server.

use super::LifecycleDomainError;

/// Address players use to join, plus the optional join password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoint {
    host: String,
    port: String,
    password: Option<String>,
}

impl ServerEndpoint {
    /// Creates a validated endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleDomainError`] when the host or port is blank.
    pub fn new(
        host: impl Into<String>,
        port: impl Into<String>,
    ) -> Result<Self, LifecycleDomainError> {
        let normalized_host = host.into().trim().to_owned();
        if normalized_host.is_empty() {
            return Err(LifecycleDomainError::EmptyHost);
        }
        let normalized_port = port.into().trim().to_owned();
        if normalized_port.is_empty() {
            return Err(LifecycleDomainError::EmptyPort);
        }
        Ok(Self {
            host: normalized_host,
            port: normalized_port,
            password: None,
        })
    }

    /// Sets the join password; blank values mean no password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        let raw = password.into();
        self.password = (!raw.is_empty()).then_some(raw);
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> &str {
        &self.port
    }

    /// Returns the join password, if any.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}
