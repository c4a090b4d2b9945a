//! Background tasks that feed events into the monitor actor.
//!
//! None of these tasks touch lifecycle state. Each performs its blocking
//! work (probes, supervisor commands) and reports the outcome as a
//! [`MonitorEvent`] through the actor's queue.

use super::StatusProbe;
use crate::lifecycle::{
    domain::ServerSnapshot,
    ports::{ServerSupervisor, StatusOracle},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Inputs processed by the monitor actor, one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum MonitorEvent {
    StartRequested,
    Tick {
        epoch: u64,
        snapshot: ServerSnapshot,
    },
    WaitTick {
        session: u64,
        snapshot: ServerSnapshot,
    },
    StartFailed(String),
    StartConfirmed,
    StartTimedOut,
    StopCompleted(Result<(), String>),
}

/// Sends `event`, returning `false` once the actor has gone away.
pub(super) fn deliver(events: &UnboundedSender<MonitorEvent>, event: MonitorEvent) -> bool {
    if events.send(event).is_err() {
        debug!("monitor is gone, dropping event");
        return false;
    }
    true
}

/// Probes the server every `period` until cancelled.
///
/// Each tick carries the machine epoch read just before its query began.
pub(super) async fn tick_loop<O>(
    probe: StatusProbe<O>,
    period: Duration,
    epoch: watch::Receiver<u64>,
    events: UnboundedSender<MonitorEvent>,
    cancel: CancellationToken,
) where
    O: StatusOracle,
{
    probe_every(
        &probe,
        period,
        &cancel,
        || *epoch.borrow(),
        |epoch, snapshot| deliver(&events, MonitorEvent::Tick { epoch, snapshot }),
    )
    .await;
    debug!("main tick loop stopped");
}

/// Drives the join countdown for `session` until cancelled.
pub(super) async fn wait_loop<O>(
    probe: StatusProbe<O>,
    period: Duration,
    session: u64,
    events: UnboundedSender<MonitorEvent>,
    cancel: CancellationToken,
) where
    O: StatusOracle,
{
    probe_every(
        &probe,
        period,
        &cancel,
        || session,
        |session, snapshot| deliver(&events, MonitorEvent::WaitTick { session, snapshot }),
    )
    .await;
    debug!(session, "player wait loop stopped");
}

async fn probe_every<O, T, G, F>(
    probe: &StatusProbe<O>,
    period: Duration,
    cancel: &CancellationToken,
    mut tag: G,
    mut report: F,
) where
    O: StatusOracle,
    G: FnMut() -> T,
    F: FnMut(T, ServerSnapshot) -> bool,
{
    let first = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
    let mut ticker = tokio::time::interval_at(first, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            () = cancel.cancelled() => return,
            _ = ticker.tick() => {}
        }
        let tagged = tag();
        let snapshot = tokio::select! {
            () = cancel.cancelled() => return,
            snapshot = probe.query() => snapshot,
        };
        // The loop may have been cancelled while the query was in flight.
        if cancel.is_cancelled() || !report(tagged, snapshot) {
            return;
        }
    }
}

/// Timing of the one-shot start task.
#[derive(Debug, Clone, Copy)]
pub(super) struct StartTiming {
    pub(super) timeout: Duration,
    pub(super) poll_interval: Duration,
}

/// Runs the supervisor start, then polls until the server answers.
pub(super) async fn start_task<S, O>(
    supervisor: Arc<S>,
    probe: StatusProbe<O>,
    timing: StartTiming,
    events: UnboundedSender<MonitorEvent>,
    cancel: CancellationToken,
) where
    S: ServerSupervisor,
    O: StatusOracle,
{
    let outcome = tokio::select! {
        () = cancel.cancelled() => return,
        outcome = run_start(supervisor.as_ref(), &probe, timing) => outcome,
    };
    deliver(&events, outcome);
}

async fn run_start<S, O>(supervisor: &S, probe: &StatusProbe<O>, timing: StartTiming) -> MonitorEvent
where
    S: ServerSupervisor,
    O: StatusOracle,
{
    info!("running supervisor start");
    if let Err(err) = supervisor.start().await {
        return MonitorEvent::StartFailed(err.to_string());
    }
    let online = tokio::time::timeout(timing.timeout, async {
        loop {
            let snapshot = probe.query().await;
            if !snapshot.is_error() {
                return;
            }
            debug!(detail = ?snapshot.detail(), "server not answering yet");
            tokio::time::sleep(timing.poll_interval).await;
        }
    })
    .await;
    match online {
        Ok(()) => MonitorEvent::StartConfirmed,
        Err(_elapsed) => MonitorEvent::StartTimedOut,
    }
}

/// Runs the supervisor stop and reports its outcome.
///
/// A stop is not cancellable: once issued it runs to completion.
pub(super) async fn stop_task<S>(supervisor: Arc<S>, events: UnboundedSender<MonitorEvent>)
where
    S: ServerSupervisor,
{
    info!("running supervisor stop");
    let outcome = supervisor.stop().await.map_err(|err| err.to_string());
    deliver(&events, MonitorEvent::StopCompleted(outcome));
}
