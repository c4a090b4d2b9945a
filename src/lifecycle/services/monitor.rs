//! Serialized driver for the lifecycle machine.

use super::notifier::{Delivery, Notifier};
use super::tasks::{self, MonitorEvent, StartTiming};
use super::{MessageRenderer, RenderError, StatusProbe};
use crate::lifecycle::{
    domain::{AutoStopPolicy, Effect, LifecycleMachine, LifecyclePhase, ServerEndpoint},
    ports::{ServerSupervisor, StatusOracle},
};
use crate::notification::{
    ports::{HandleStore, NotificationChannel},
    services::NotificationSink,
};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Static configuration of a monitor.
///
/// Timers default to the production values; [`LifecycleMonitor::spawn`]
/// refuses settings with a zero timer.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    policy: AutoStopPolicy,
    endpoint: ServerEndpoint,
    query_timeout: Duration,
    wait_player_interval: Duration,
    start_timeout: Duration,
    start_poll_interval: Duration,
}

impl MonitorSettings {
    /// Creates settings with the default timings.
    #[must_use]
    pub const fn new(policy: AutoStopPolicy, endpoint: ServerEndpoint) -> Self {
        Self {
            policy,
            endpoint,
            query_timeout: Duration::from_secs(10),
            wait_player_interval: Duration::from_secs(3),
            start_timeout: Duration::from_secs(300),
            start_poll_interval: Duration::from_secs(5),
        }
    }

    /// Sets the upper bound on a single status query.
    #[must_use]
    pub const fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Sets the cadence of the join countdown loop.
    #[must_use]
    pub const fn with_wait_player_interval(mut self, interval: Duration) -> Self {
        self.wait_player_interval = interval;
        self
    }

    /// Sets how long a start may take before it is abandoned.
    #[must_use]
    pub const fn with_start_timeout(mut self, timeout: Duration) -> Self {
        self.start_timeout = timeout;
        self
    }

    /// Sets the probe cadence while a start is coming up.
    #[must_use]
    pub const fn with_start_poll_interval(mut self, interval: Duration) -> Self {
        self.start_poll_interval = interval;
        self
    }

    /// Auto-stop thresholds and main tick cadence.
    #[must_use]
    pub const fn policy(&self) -> &AutoStopPolicy {
        &self.policy
    }

    /// Server players connect to and probes target.
    #[must_use]
    pub const fn endpoint(&self) -> &ServerEndpoint {
        &self.endpoint
    }

    /// Upper bound on a single status query.
    #[must_use]
    pub const fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Cadence of the join countdown loop.
    #[must_use]
    pub const fn wait_player_interval(&self) -> Duration {
        self.wait_player_interval
    }

    /// How long a start may take before it is abandoned.
    #[must_use]
    pub const fn start_timeout(&self) -> Duration {
        self.start_timeout
    }

    /// Probe cadence while a start is coming up.
    #[must_use]
    pub const fn start_poll_interval(&self) -> Duration {
        self.start_poll_interval
    }

    /// Names the first timer set to zero, if any.
    #[must_use]
    pub fn zero_timer(&self) -> Option<&'static str> {
        [
            ("query timeout", self.query_timeout),
            ("wait player interval", self.wait_player_interval),
            ("start timeout", self.start_timeout),
            ("start poll interval", self.start_poll_interval),
        ]
        .into_iter()
        .find_map(|(name, duration)| duration.is_zero().then_some(name))
    }
}

/// Published after every processed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorStatus {
    /// Current lifecycle phase.
    pub phase: LifecyclePhase,
    /// Consecutive empty ticks observed while monitoring.
    pub empty_checks: u32,
}

impl MonitorStatus {
    fn of(machine: &LifecycleMachine) -> Self {
        Self {
            phase: machine.phase(),
            empty_checks: machine.empty_checks(),
        }
    }
}

/// Errors raised by the monitor service.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Message templates could not be prepared.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// A timer in the settings is zero.
    #[error("{0} must be greater than zero")]
    ZeroTimer(&'static str),

    /// The monitor has already shut down.
    #[error("monitor is not running")]
    NotRunning,

    /// The monitor task panicked or was aborted.
    #[error("monitor task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Control surface of a running monitor.
#[derive(Debug)]
pub struct MonitorHandle {
    events: mpsc::UnboundedSender<MonitorEvent>,
    status: watch::Receiver<MonitorStatus>,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Queues a start request and returns without waiting for it.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::NotRunning`] once the monitor has stopped.
    pub fn request_start(&self) -> Result<(), MonitorError> {
        self.requester().request_start()
    }

    /// Returns a start trigger that can outlive borrows of the handle.
    #[must_use]
    pub fn requester(&self) -> StartRequester {
        StartRequester {
            events: self.events.clone(),
        }
    }

    /// Returns the most recently published status.
    #[must_use]
    pub fn status(&self) -> MonitorStatus {
        *self.status.borrow()
    }

    /// Returns a receiver that observes every status change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<MonitorStatus> {
        self.status.clone()
    }

    /// Stops all loops and waits for the monitor to exit.
    ///
    /// Notifications already handed to the notifier are written first.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Join`] if the monitor task panicked.
    pub async fn shutdown(self) -> Result<(), MonitorError> {
        self.shutdown.cancel();
        self.task.await?;
        Ok(())
    }
}

/// Cloneable sender of start requests.
#[derive(Debug, Clone)]
pub struct StartRequester {
    events: mpsc::UnboundedSender<MonitorEvent>,
}

impl StartRequester {
    /// Queues a start request and returns without waiting for it.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::NotRunning`] once the monitor has stopped.
    pub fn request_start(&self) -> Result<(), MonitorError> {
        self.events
            .send(MonitorEvent::StartRequested)
            .map_err(|_closed| MonitorError::NotRunning)
    }
}

/// Single-owner actor applying lifecycle events in arrival order.
///
/// The main tick loop, the join countdown loop, and the start and stop
/// tasks run concurrently but only ever send events. All machine state lives
/// on the actor task, so no transition can interleave with another.
/// Rendered messages go to the notifier task, so a slow channel never holds
/// up a transition.
pub struct LifecycleMonitor<S, O, C>
where
    S: ServerSupervisor + 'static,
    O: StatusOracle + 'static,
    C: Clock + Send + Sync + 'static,
{
    machine: LifecycleMachine,
    settings: MonitorSettings,
    supervisor: Arc<S>,
    probe: StatusProbe<O>,
    notifier: Notifier,
    renderer: MessageRenderer,
    clock: Arc<C>,
    events: mpsc::UnboundedSender<MonitorEvent>,
    status: watch::Sender<MonitorStatus>,
    epoch: watch::Sender<u64>,
    shutdown: CancellationToken,
    wait_loop: Option<CancellationToken>,
}

impl<S, O, C> LifecycleMonitor<S, O, C>
where
    S: ServerSupervisor + 'static,
    O: StatusOracle + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Starts the monitor on the current tokio runtime.
    ///
    /// The machine begins in `Stopped`; a server that is already running is
    /// adopted on the first main tick.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::ZeroTimer`] if a timer in `settings` is zero,
    /// or [`MonitorError::Render`] if the message templates are invalid.
    pub fn spawn<N, H>(
        settings: MonitorSettings,
        supervisor: Arc<S>,
        oracle: Arc<O>,
        sink: NotificationSink<N, H>,
        clock: Arc<C>,
    ) -> Result<MonitorHandle, MonitorError>
    where
        N: NotificationChannel + 'static,
        H: HandleStore + 'static,
    {
        if let Some(timer) = settings.zero_timer() {
            return Err(MonitorError::ZeroTimer(timer));
        }
        let renderer = MessageRenderer::new(settings.endpoint.clone())?;
        let probe = StatusProbe::new(oracle, settings.endpoint.clone(), settings.query_timeout);
        let machine = LifecycleMachine::new(settings.policy);
        let (events, inbox) = mpsc::unbounded_channel();
        let (status, status_rx) = watch::channel(MonitorStatus::of(&machine));
        let (epoch, _) = watch::channel(machine.epoch());
        let shutdown = CancellationToken::new();
        let (notifier, delivery) = Notifier::spawn(sink);

        let monitor = Self {
            machine,
            settings,
            supervisor,
            probe,
            notifier,
            renderer,
            clock,
            events: events.clone(),
            status,
            epoch,
            shutdown: shutdown.clone(),
            wait_loop: None,
        };
        let task = tokio::spawn(monitor.run(inbox, delivery));
        Ok(MonitorHandle {
            events,
            status: status_rx,
            shutdown,
            task,
        })
    }

    async fn run(
        mut self,
        mut inbox: mpsc::UnboundedReceiver<MonitorEvent>,
        delivery: JoinHandle<()>,
    ) {
        info!(
            host = self.settings.endpoint.host(),
            port = self.settings.endpoint.port(),
            check_interval_secs = self.settings.policy.check_interval().as_secs(),
            "lifecycle monitor started"
        );
        tokio::spawn(tasks::tick_loop(
            self.probe.clone(),
            self.settings.policy.check_interval(),
            self.epoch.subscribe(),
            self.events.clone(),
            self.shutdown.child_token(),
        ));

        loop {
            tokio::select! {
                biased;
                () = self.shutdown.cancelled() => break,
                Some(event) = inbox.recv() => self.apply(event),
                else => break,
            }
        }

        self.cancel_wait_loop();
        let phase = self.machine.phase();
        drop(self);
        if let Err(err) = delivery.await {
            warn!(error = %err, "notifier task failed");
        }
        info!(%phase, "lifecycle monitor stopped");
    }

    fn apply(&mut self, event: MonitorEvent) {
        let before = self.machine.phase();
        let clock = Arc::clone(&self.clock);
        let effects = match event {
            MonitorEvent::StartRequested => self.machine.request_start(),
            MonitorEvent::Tick { epoch, snapshot } => {
                debug!(
                    players = snapshot.player_count(),
                    empty_checks = self.machine.empty_checks(),
                    phase = %before,
                    epoch,
                    "main tick"
                );
                if epoch != self.machine.epoch() {
                    debug!(
                        epoch,
                        current = self.machine.epoch(),
                        "dropping tick queried before the last stop"
                    );
                }
                self.machine
                    .observe_in_epoch(epoch, &snapshot, clock.as_ref())
            }
            MonitorEvent::WaitTick { session, snapshot } => {
                self.machine.observe_wait(session, &snapshot, clock.as_ref())
            }
            MonitorEvent::StartFailed(reason) => {
                warn!(%reason, "server start failed");
                self.machine.start_failed(&reason)
            }
            MonitorEvent::StartConfirmed => self.machine.start_confirmed(clock.as_ref()),
            MonitorEvent::StartTimedOut => {
                warn!(
                    timeout_secs = self.settings.start_timeout.as_secs(),
                    "server did not come up in time"
                );
                self.machine.start_timed_out()
            }
            MonitorEvent::StopCompleted(outcome) => {
                if let Err(reason) = &outcome {
                    warn!(%reason, "server stop failed");
                }
                self.machine.stop_completed(outcome)
            }
        };

        let after = self.machine.phase();
        if before != after {
            info!(from = %before, to = %after, "lifecycle phase changed");
        }
        for effect in effects {
            self.perform(effect);
        }
        let current = self.machine.epoch();
        self.epoch.send_if_modified(|epoch| {
            let changed = *epoch != current;
            *epoch = current;
            changed
        });
        self.status.send_replace(MonitorStatus::of(&self.machine));
    }

    fn perform(&mut self, effect: Effect) {
        match effect {
            Effect::MirrorStatus(snapshot) => match self.renderer.status(&snapshot) {
                Ok(content) => self.notifier.mirror(content),
                Err(err) => warn!(error = %err, "could not render status message"),
            },
            Effect::RenderStartup(view) => match self.renderer.startup(&view) {
                Ok(content) => self.notifier.deliver(Delivery::Startup(content)),
                Err(err) => warn!(error = %err, "could not render startup message"),
            },
            Effect::RefreshStartup(view) => match self.renderer.startup(&view) {
                Ok(content) => self.notifier.deliver(Delivery::RefreshStartup(content)),
                Err(err) => warn!(error = %err, "could not render startup message"),
            },
            Effect::ClearStartup => self.notifier.deliver(Delivery::ClearStartup),
            Effect::Announce(notice) => {
                self.notifier.deliver(Delivery::Announce(notice.to_string()));
            }
            Effect::StartServer => {
                tokio::spawn(tasks::start_task(
                    Arc::clone(&self.supervisor),
                    self.probe.clone(),
                    StartTiming {
                        timeout: self.settings.start_timeout,
                        poll_interval: self.settings.start_poll_interval,
                    },
                    self.events.clone(),
                    self.shutdown.child_token(),
                ));
            }
            Effect::StopServer => {
                tokio::spawn(tasks::stop_task(
                    Arc::clone(&self.supervisor),
                    self.events.clone(),
                ));
            }
            Effect::SpawnWaitLoop { session } => {
                self.cancel_wait_loop();
                let cancel = self.shutdown.child_token();
                self.wait_loop = Some(cancel.clone());
                tokio::spawn(tasks::wait_loop(
                    self.probe.clone(),
                    self.settings.wait_player_interval,
                    session,
                    self.events.clone(),
                    cancel,
                ));
            }
            Effect::CancelWaitLoop => self.cancel_wait_loop(),
        }
    }

    fn cancel_wait_loop(&mut self) {
        if let Some(cancel) = self.wait_loop.take() {
            cancel.cancel();
        }
    }
}
