//! Thresholds and windows that govern automatic shutdown.

use super::LifecycleDomainError;
use std::time::Duration;

const DEFAULT_MAX_EMPTY_CHECKS: u32 = 7;
const DEFAULT_WARNING_CHECK: u32 = 5;
const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_PLAYER_WAIT: Duration = Duration::from_secs(300);
const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(300);

/// Auto-stop thresholds.
///
/// The server is stopped on the `max_empty_checks`-th consecutive empty main
/// tick, and warned about on the `warning_check`-th one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoStopPolicy {
    max_empty_checks: u32,
    warning_check: u32,
    check_interval: Duration,
    player_wait: Duration,
    grace_period: Duration,
}

impl AutoStopPolicy {
    /// Creates a validated policy.
    ///
    /// A zero `grace_period` disables the grace window entirely.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleDomainError`] when the thresholds are inconsistent
    /// or a timer duration is zero.
    pub fn new(
        max_empty_checks: u32,
        warning_check: u32,
        check_interval: Duration,
        player_wait: Duration,
        grace_period: Duration,
    ) -> Result<Self, LifecycleDomainError> {
        if max_empty_checks == 0 {
            return Err(LifecycleDomainError::ZeroMaxEmptyChecks);
        }
        if warning_check == 0 || warning_check >= max_empty_checks {
            return Err(LifecycleDomainError::WarningCheckOutOfRange {
                warning_check,
                max_empty_checks,
            });
        }
        if check_interval.is_zero() {
            return Err(LifecycleDomainError::ZeroDuration("check interval"));
        }
        if player_wait.is_zero() {
            return Err(LifecycleDomainError::ZeroDuration("player wait"));
        }
        Ok(Self {
            max_empty_checks,
            warning_check,
            check_interval,
            player_wait,
            grace_period,
        })
    }

    /// Returns the consecutive empty-tick count that triggers a stop.
    #[must_use]
    pub const fn max_empty_checks(&self) -> u32 {
        self.max_empty_checks
    }

    /// Returns the consecutive empty-tick count that triggers the warning.
    #[must_use]
    pub const fn warning_check(&self) -> u32 {
        self.warning_check
    }

    /// Returns the main tick interval.
    #[must_use]
    pub const fn check_interval(&self) -> Duration {
        self.check_interval
    }

    /// Returns how long a freshly started server waits for its first player.
    #[must_use]
    pub const fn player_wait(&self) -> Duration {
        self.player_wait
    }

    /// Returns the grace window applied to a server found already running.
    #[must_use]
    pub const fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Returns the time left between the warning and the stop.
    #[must_use]
    pub fn warning_lead(&self) -> Duration {
        self.check_interval
            .saturating_mul(self.max_empty_checks - self.warning_check)
    }

    /// Returns how long the server may stay empty before it is stopped.
    #[must_use]
    pub fn auto_stop_window(&self) -> Duration {
        self.check_interval.saturating_mul(self.max_empty_checks)
    }
}

impl Default for AutoStopPolicy {
    fn default() -> Self {
        Self {
            max_empty_checks: DEFAULT_MAX_EMPTY_CHECKS,
            warning_check: DEFAULT_WARNING_CHECK,
            check_interval: DEFAULT_CHECK_INTERVAL,
            player_wait: DEFAULT_PLAYER_WAIT,
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_windows_match_thresholds() {
        let policy = AutoStopPolicy::default();

        assert_eq!(policy.warning_lead(), Duration::from_secs(20));
        assert_eq!(policy.auto_stop_window(), Duration::from_secs(70));
    }

    #[rstest]
    #[case(7, 0)]
    #[case(7, 7)]
    #[case(7, 9)]
    fn warning_must_precede_stop(#[case] max: u32, #[case] warning: u32) {
        let result = AutoStopPolicy::new(
            max,
            warning,
            Duration::from_secs(10),
            Duration::from_secs(300),
            Duration::ZERO,
        );

        assert_eq!(
            result,
            Err(LifecycleDomainError::WarningCheckOutOfRange {
                warning_check: warning,
                max_empty_checks: max,
            })
        );
    }

    #[test]
    fn zero_check_interval_is_rejected() {
        let result = AutoStopPolicy::new(
            7,
            5,
            Duration::ZERO,
            Duration::from_secs(300),
            Duration::ZERO,
        );

        assert_eq!(
            result,
            Err(LifecycleDomainError::ZeroDuration("check interval"))
        );
    }
}
