//! Lifecycle state machine.

use super::{AutoStopPolicy, Effect, LifecyclePhase, Notice, ServerSnapshot, StartupView};
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use std::time::Duration;

/// Phase plus the data that only exists while that phase is active.
///
/// Keeping deadlines and the empty-tick counter inside their variants means
/// leaving a phase discards them; no stale deadline can survive a
/// transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Stopped,
    Starting,
    AwaitingFirstPlayer {
        wait_until: DateTime<Utc>,
        session: u64,
    },
    GracePeriod {
        until: DateTime<Utc>,
    },
    Monitoring {
        empty_checks: u32,
    },
    Draining {
        empty_checks: u32,
    },
}

/// Transition table for the managed server.
///
/// Every method applies one event and returns the effects the caller must
/// perform, in order. Events that do not apply to the current phase (a late
/// wait-loop tick, a start confirmation after a stop) are ignored and
/// produce no effects.
#[derive(Debug, Clone)]
pub struct LifecycleMachine {
    policy: AutoStopPolicy,
    stage: Stage,
    last_session: u64,
    epoch: u64,
}

impl LifecycleMachine {
    /// Creates a machine in the `Stopped` phase.
    #[must_use]
    pub const fn new(policy: AutoStopPolicy) -> Self {
        Self {
            policy,
            stage: Stage::Stopped,
            last_session: 0,
            epoch: 0,
        }
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> LifecyclePhase {
        match self.stage {
            Stage::Stopped => LifecyclePhase::Stopped,
            Stage::Starting => LifecyclePhase::Starting,
            Stage::AwaitingFirstPlayer { .. } => LifecyclePhase::AwaitingFirstPlayer,
            Stage::GracePeriod { .. } => LifecyclePhase::GracePeriod,
            Stage::Monitoring { .. } => LifecyclePhase::Monitoring,
            Stage::Draining { .. } => LifecyclePhase::Draining,
        }
    }

    /// Returns the consecutive empty-tick count.
    #[must_use]
    pub const fn empty_checks(&self) -> u32 {
        match self.stage {
            Stage::Monitoring { empty_checks } | Stage::Draining { empty_checks } => empty_checks,
            _ => 0,
        }
    }

    /// Returns the grace deadline, set only during `GracePeriod`.
    #[must_use]
    pub const fn grace_deadline(&self) -> Option<DateTime<Utc>> {
        match self.stage {
            Stage::GracePeriod { until } => Some(until),
            _ => None,
        }
    }

    /// Returns the join deadline, set only during `AwaitingFirstPlayer`.
    #[must_use]
    pub const fn player_wait_deadline(&self) -> Option<DateTime<Utc>> {
        match self.stage {
            Stage::AwaitingFirstPlayer { wait_until, .. } => Some(wait_until),
            _ => None,
        }
    }

    /// Returns the session tag of the active player-wait loop.
    #[must_use]
    pub const fn wait_session(&self) -> Option<u64> {
        match self.stage {
            Stage::AwaitingFirstPlayer { session, .. } => Some(session),
            _ => None,
        }
    }

    /// Returns how many times the machine has returned to `Stopped`.
    ///
    /// A main-loop query tagged with an older epoch began before the last
    /// return to `Stopped` and no longer describes the server.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Handles an external start request.
    pub fn request_start(&mut self) -> Vec<Effect> {
        if self.stage != Stage::Stopped {
            return vec![Effect::Announce(Notice::AlreadyActive(self.phase()))];
        }
        self.stage = Stage::Starting;
        vec![
            Effect::Announce(Notice::StartRequested),
            Effect::StartServer,
        ]
    }

    /// Handles a failed supervisor start.
    pub fn start_failed(&mut self, reason: &str) -> Vec<Effect> {
        if self.stage != Stage::Starting {
            return Vec::new();
        }
        self.return_to_stopped();
        vec![Effect::Announce(Notice::StartFailed(reason.to_owned()))]
    }

    /// Handles a start that never produced a healthy probe.
    pub fn start_timed_out(&mut self) -> Vec<Effect> {
        if self.stage != Stage::Starting {
            return Vec::new();
        }
        self.return_to_stopped();
        vec![Effect::Announce(Notice::StartTimedOut)]
    }

    /// Handles the first healthy probe after a start.
    pub fn start_confirmed(&mut self, clock: &impl Clock) -> Vec<Effect> {
        if self.stage != Stage::Starting {
            return Vec::new();
        }
        self.last_session += 1;
        let session = self.last_session;
        let now = clock.utc();
        let wait_until = deadline_after(now, self.policy.player_wait());
        self.stage = Stage::AwaitingFirstPlayer {
            wait_until,
            session,
        };
        vec![
            Effect::RenderStartup(StartupView::countdown(0, seconds_until(wait_until, now))),
            Effect::SpawnWaitLoop { session },
        ]
    }

    /// Handles a main-loop tick.
    ///
    /// The status slot is mirrored on every tick regardless of phase.
    pub fn observe(&mut self, snapshot: &ServerSnapshot, clock: &impl Clock) -> Vec<Effect> {
        let mut effects = vec![Effect::MirrorStatus(snapshot.clone())];
        let now = clock.utc();

        match self.stage {
            Stage::Stopped if snapshot.is_error() => effects.push(Effect::ClearStartup),
            Stage::Stopped => self.adopt_running_server(now),
            Stage::Starting | Stage::Draining { .. } => {}
            Stage::AwaitingFirstPlayer { wait_until, .. } => {
                self.observe_while_waiting(snapshot, wait_until, now, &mut effects);
            }
            Stage::GracePeriod { .. } if snapshot.is_error() => {
                self.enter_stopped(&mut effects);
            }
            Stage::GracePeriod { until } if now < until => {}
            Stage::GracePeriod { .. } => self.count_empty_tick(0, snapshot, &mut effects),
            Stage::Monitoring { .. } if snapshot.is_error() => {
                self.enter_stopped(&mut effects);
            }
            Stage::Monitoring { empty_checks } => {
                self.count_empty_tick(empty_checks, snapshot, &mut effects);
            }
        }
        effects
    }

    /// Handles a main-loop tick whose query began during `epoch`.
    ///
    /// Ticks from an earlier epoch are dropped whole, status mirror
    /// included, so a query that raced a stop cannot revive the server.
    pub fn observe_in_epoch(
        &mut self,
        epoch: u64,
        snapshot: &ServerSnapshot,
        clock: &impl Clock,
    ) -> Vec<Effect> {
        if epoch != self.epoch {
            return Vec::new();
        }
        self.observe(snapshot, clock)
    }

    /// Handles a player-wait loop tick tagged with `session`.
    ///
    /// Ticks from a loop that no longer matches the active session are
    /// ignored.
    pub fn observe_wait(
        &mut self,
        session: u64,
        snapshot: &ServerSnapshot,
        clock: &impl Clock,
    ) -> Vec<Effect> {
        let Stage::AwaitingFirstPlayer {
            wait_until,
            session: active,
        } = self.stage
        else {
            return Vec::new();
        };
        if active != session {
            return Vec::new();
        }

        let mut effects = Vec::new();
        let now = clock.utc();
        self.observe_while_waiting(snapshot, wait_until, now, &mut effects);
        if self.stage == (Stage::AwaitingFirstPlayer { wait_until, session }) {
            effects.push(Effect::RefreshStartup(StartupView::countdown(
                snapshot.player_count(),
                seconds_until(wait_until, now),
            )));
        }
        effects
    }

    /// Handles the outcome of the supervisor stop command.
    ///
    /// The machine returns to `Stopped` whether or not the command worked.
    pub fn stop_completed(&mut self, outcome: Result<(), String>) -> Vec<Effect> {
        if !matches!(self.stage, Stage::Draining { .. }) {
            return Vec::new();
        }
        let notice = match outcome {
            Ok(()) => Notice::StopSucceeded,
            Err(reason) => Notice::StopFailed(reason),
        };
        let mut effects = vec![Effect::Announce(notice)];
        self.enter_stopped(&mut effects);
        effects
    }

    fn adopt_running_server(&mut self, now: DateTime<Utc>) {
        let grace = self.policy.grace_period();
        self.stage = if grace.is_zero() {
            Stage::Monitoring { empty_checks: 0 }
        } else {
            Stage::GracePeriod {
                until: deadline_after(now, grace),
            }
        };
    }

    fn observe_while_waiting(
        &mut self,
        snapshot: &ServerSnapshot,
        wait_until: DateTime<Utc>,
        now: DateTime<Utc>,
        effects: &mut Vec<Effect>,
    ) {
        if snapshot.is_error() {
            self.enter_stopped(effects);
        } else if snapshot.player_count() > 0 {
            effects.push(Effect::CancelWaitLoop);
            effects.push(Effect::RefreshStartup(StartupView::joined(
                snapshot.player_count(),
            )));
            effects.push(Effect::Announce(Notice::AutoStopRule {
                window: self.policy.auto_stop_window(),
            }));
            self.stage = Stage::Monitoring { empty_checks: 0 };
        } else if now >= wait_until {
            effects.push(Effect::CancelWaitLoop);
            self.stage = Stage::Monitoring { empty_checks: 0 };
        }
    }

    fn count_empty_tick(
        &mut self,
        empty_checks: u32,
        snapshot: &ServerSnapshot,
        effects: &mut Vec<Effect>,
    ) {
        if snapshot.player_count() > 0 {
            if empty_checks > 0 {
                effects.push(Effect::RefreshStartup(StartupView::joined(
                    snapshot.player_count(),
                )));
            }
            self.stage = Stage::Monitoring { empty_checks: 0 };
            return;
        }

        let count = empty_checks
            .saturating_add(1)
            .min(self.policy.max_empty_checks());
        if count == self.policy.warning_check() {
            let remaining = self.policy.warning_lead();
            effects.push(Effect::Announce(Notice::EmptyWarning { remaining }));
            effects.push(Effect::RefreshStartup(StartupView::empty_warning(remaining)));
        }
        if count >= self.policy.max_empty_checks() {
            effects.push(Effect::Announce(Notice::AutoStopping));
            effects.push(Effect::StopServer);
            self.stage = Stage::Draining {
                empty_checks: count,
            };
        } else {
            self.stage = Stage::Monitoring {
                empty_checks: count,
            };
        }
    }

    fn enter_stopped(&mut self, effects: &mut Vec<Effect>) {
        if matches!(self.stage, Stage::AwaitingFirstPlayer { .. }) {
            effects.push(Effect::CancelWaitLoop);
        }
        effects.push(Effect::ClearStartup);
        self.return_to_stopped();
    }

    fn return_to_stopped(&mut self) {
        self.stage = Stage::Stopped;
        self.epoch = self.epoch.wrapping_add(1);
    }
}

fn deadline_after(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(window)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Whole seconds left until `deadline`, rounded up.
fn seconds_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let remaining = deadline - now;
    if remaining <= TimeDelta::zero() {
        return 0;
    }
    let whole = remaining.num_seconds();
    let has_fraction = TimeDelta::try_seconds(whole).is_some_and(|truncated| remaining > truncated);
    let rounded = if has_fraction { whole + 1 } else { whole };
    u64::try_from(rounded).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_until_rounds_up() {
        let now = DateTime::<Utc>::UNIX_EPOCH;
        let deadline = now + TimeDelta::milliseconds(2_500);

        assert_eq!(seconds_until(deadline, now), 3);
        assert_eq!(seconds_until(now, deadline), 0);
        assert_eq!(seconds_until(now + TimeDelta::seconds(300), now), 300);
    }
}
