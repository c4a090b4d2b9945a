//! Wall-clock time derived from the runtime's monotonic clock.

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use tokio::time::Instant;

/// Clock that reads UTC time as a fixed anchor plus monotonic elapsed time.
///
/// Deadlines computed from this clock are immune to wall-clock adjustments
/// and follow the tokio clock, so paused-time tests advance it together with
/// their timers.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    anchor_utc: DateTime<Utc>,
    anchor: Instant,
}

impl MonotonicClock {
    /// Anchors the clock at the current system time.
    #[must_use]
    pub fn new() -> Self {
        Self::anchored_at(Utc::now())
    }

    /// Anchors the clock at `utc`, counting forward from now.
    #[must_use]
    pub fn anchored_at(utc: DateTime<Utc>) -> Self {
        Self {
            anchor_utc: utc,
            anchor: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        TimeDelta::from_std(self.anchor.elapsed())
            .ok()
            .and_then(|elapsed| self.anchor_utc.checked_add_signed(elapsed))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn follows_paused_runtime_time() {
        let anchor = DateTime::<Utc>::UNIX_EPOCH;
        let clock = MonotonicClock::anchored_at(anchor);

        tokio::time::advance(Duration::from_secs(90)).await;

        assert_eq!(clock.utc(), anchor + TimeDelta::seconds(90));
    }
}
