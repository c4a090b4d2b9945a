//! Discrete lifecycle phases.

use std::fmt;

/// Current phase of the managed server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    /// Server is not running and nothing is in flight.
    Stopped,
    /// Supervisor start issued, waiting for the first healthy probe.
    Starting,
    /// Server is up and the join countdown is running.
    AwaitingFirstPlayer,
    /// Server was found running; auto-stop is suspended until the deadline.
    GracePeriod,
    /// Auto-stop is armed and counting empty ticks.
    Monitoring,
    /// Supervisor stop issued, waiting for its outcome.
    Draining,
}

impl LifecyclePhase {
    /// Returns the canonical phase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::AwaitingFirstPlayer => "awaiting_first_player",
            Self::GracePeriod => "grace_period",
            Self::Monitoring => "monitoring",
            Self::Draining => "draining",
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
