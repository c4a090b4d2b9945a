//! Side effects requested by the lifecycle machine.

use super::{LifecyclePhase, ServerSnapshot};
use std::fmt;
use std::time::Duration;

/// Work the caller must perform after a transition.
///
/// Effects are returned in the order they must be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Rewrite the status slot from the latest snapshot.
    MirrorStatus(ServerSnapshot),
    /// Write the startup slot, creating it when unbound.
    RenderStartup(StartupView),
    /// Rewrite the startup slot only if it is already bound.
    RefreshStartup(StartupView),
    /// Forget the startup slot binding.
    ClearStartup,
    /// Post a one-off announcement.
    Announce(Notice),
    /// Launch the one-shot start task.
    StartServer,
    /// Run the supervisor stop command.
    StopServer,
    /// Launch the player-wait countdown loop for `session`.
    SpawnWaitLoop {
        /// Session tag the loop must echo back with every tick.
        session: u64,
    },
    /// Cancel the player-wait countdown loop, if any.
    CancelWaitLoop,
}

/// Content model of the startup slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupView {
    /// Players currently connected.
    pub player_count: u32,
    /// Seconds left to join, when the countdown is still running.
    pub countdown_secs: Option<u64>,
    /// Status line appended below the connection details.
    pub banner: Option<StartupBanner>,
}

impl StartupView {
    /// View shown while waiting for the first player.
    #[must_use]
    pub const fn countdown(player_count: u32, countdown_secs: u64) -> Self {
        Self {
            player_count,
            countdown_secs: Some(countdown_secs),
            banner: None,
        }
    }

    /// View shown once a player is connected.
    #[must_use]
    pub const fn joined(player_count: u32) -> Self {
        Self {
            player_count,
            countdown_secs: None,
            banner: Some(StartupBanner::PlayerJoined),
        }
    }

    /// View shown when the server is about to be stopped for being empty.
    #[must_use]
    pub const fn empty_warning(remaining: Duration) -> Self {
        Self {
            player_count: 0,
            countdown_secs: None,
            banner: Some(StartupBanner::EmptyWarning { remaining }),
        }
    }
}

/// Status line shown at the bottom of the startup slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupBanner {
    /// A player has joined.
    PlayerJoined,
    /// The server will stop unless someone joins within `remaining`.
    EmptyWarning {
        /// Time left before the stop.
        remaining: Duration,
    },
}

/// One-off announcements posted to the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A start request was accepted.
    StartRequested,
    /// A start request arrived while the server was not stopped.
    AlreadyActive(LifecyclePhase),
    /// The supervisor start command failed.
    StartFailed(String),
    /// The server never answered a probe within the start timeout.
    StartTimedOut,
    /// Explains the auto-stop rule after the first player joins.
    AutoStopRule {
        /// How long the server may stay empty.
        window: Duration,
    },
    /// The server is about to be stopped for being empty.
    EmptyWarning {
        /// Time left before the stop.
        remaining: Duration,
    },
    /// The server is being stopped for being empty.
    AutoStopping,
    /// The supervisor stop command succeeded.
    StopSucceeded,
    /// The supervisor stop command failed.
    StopFailed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartRequested => f.write_str("⏳ Starting the server..."),
            Self::AlreadyActive(phase) => {
                write!(f, "ℹ️ The server is already up (current phase: {phase})")
            }
            Self::StartFailed(reason) => write!(f, "❌ Failed to start the server: {reason}"),
            Self::StartTimedOut => f.write_str("❌ Timed out waiting for the server to start"),
            Self::AutoStopRule { window } => write!(
                f,
                "ℹ️ The server stops automatically once it has had no players for {} seconds",
                window.as_secs()
            ),
            Self::EmptyWarning { remaining } => write!(
                f,
                "⚠️ The server will be stopped unless someone joins within {} seconds",
                remaining.as_secs()
            ),
            Self::AutoStopping => {
                f.write_str("🔴 Stopping the server automatically because nobody is playing")
            }
            Self::StopSucceeded => f.write_str("✅ The server stopped cleanly"),
            Self::StopFailed(reason) => write!(f, "❌ Failed to stop the server: {reason}"),
        }
    }
}
