//! End-to-end lifecycle runs against the in-memory game server.
//!
//! Every test runs on paused tokio time, so the 10-second main tick and the
//! 3-second countdown tick advance instantly and deterministically.

use std::time::Duration;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rstest::rstest;
use tokio::time::Instant;
use warden::lifecycle::{
    adapters::{MonotonicClock, memory::InMemoryGameServer},
    domain::LifecyclePhase,
    services::{LifecycleMonitor, MonitorError},
};
use warden::notification::{
    adapters::memory::{InMemoryHandleStore, InMemoryNotificationChannel},
    domain::NotificationSlot,
    services::{NotificationSink, PersistedHandles},
};

use super::helpers::{Rig, eventually, settings};

const GRACE: Duration = Duration::from_secs(300);

async fn monitoring_rig() -> Rig {
    let rig = Rig::spawn(InMemoryGameServer::new(), settings(GRACE));
    rig.handle
        .request_start()
        .expect("monitor should accept start");
    eventually("player wait", || {
        rig.phase() == LifecyclePhase::AwaitingFirstPlayer
    })
    .await;
    rig.server.set_players(1);
    eventually("first join", || rig.phase() == LifecyclePhase::Monitoring).await;
    rig
}

#[tokio::test(start_paused = true)]
async fn start_request_waits_for_first_player_then_monitors() {
    let rig = Rig::spawn(InMemoryGameServer::new(), settings(GRACE));

    rig.handle
        .request_start()
        .expect("monitor should accept start");
    eventually("player wait", || {
        rig.phase() == LifecyclePhase::AwaitingFirstPlayer
    })
    .await;

    let startup = rig
        .slot_content(NotificationSlot::Startup)
        .expect("startup slot should exist");
    assert!(startup.contains("IP: 127.0.0.1\nPort: 26900\nPassword: hunter2"));
    assert!(startup.contains("⏰ Join within 300 seconds"));
    assert_eq!(rig.posted_containing("Starting the server"), 1);

    rig.server.set_players(1);
    eventually("first join", || rig.phase() == LifecyclePhase::Monitoring).await;

    let joined = rig
        .slot_content(NotificationSlot::Startup)
        .expect("startup slot should survive the join");
    assert!(joined.contains("👥 Players online: 1"));
    assert!(joined.ends_with("✅ A player has joined!"));
    assert!(!joined.contains("⏰"));
    assert_eq!(rig.posted_containing("no players for 70 seconds"), 1);
    assert_eq!(rig.handle.status().empty_checks, 0);
    assert_eq!(rig.server.start_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn countdown_ticks_down_while_waiting() {
    let rig = Rig::spawn(InMemoryGameServer::new(), settings(GRACE));
    rig.handle
        .request_start()
        .expect("monitor should accept start");
    eventually("player wait", || {
        rig.phase() == LifecyclePhase::AwaitingFirstPlayer
    })
    .await;

    tokio::time::sleep(Duration::from_secs(31)).await;

    let startup = rig
        .slot_content(NotificationSlot::Startup)
        .expect("startup slot should exist");
    assert!(startup.contains("⏰ Join within 270 seconds"));
    assert_eq!(rig.phase(), LifecyclePhase::AwaitingFirstPlayer);
}

#[tokio::test(start_paused = true)]
async fn seven_empty_ticks_warn_once_then_stop() {
    let rig = monitoring_rig().await;
    let startup_id = rig
        .store
        .snapshot()
        .get(NotificationSlot::Startup)
        .cloned()
        .expect("startup slot should be bound");
    let emptied_at = Instant::now();

    rig.server.set_players(0);
    eventually("auto stop", || {
        rig.server.stop_calls() == 1 && rig.phase() == LifecyclePhase::Stopped
    })
    .await;

    let elapsed = emptied_at.elapsed();
    assert!(elapsed >= Duration::from_secs(60), "stopped too early: {elapsed:?}");
    assert!(elapsed <= Duration::from_secs(71), "stopped too late: {elapsed:?}");

    assert_eq!(rig.posted_containing("within 20 seconds"), 1);
    assert_eq!(rig.posted_containing("Stopping the server automatically"), 1);
    let warning = rig.position_of("within 20 seconds");
    let stopping = rig.position_of("Stopping the server automatically");
    let stopped = rig.position_of("stopped cleanly");
    assert!(warning < stopping);
    assert!(stopping < stopped);

    let last_startup = rig
        .channel
        .content(&startup_id)
        .expect("startup message should still exist");
    assert!(last_startup.contains("⚠️ The server will stop unless someone joins within 20 seconds"));
    assert_eq!(rig.store.snapshot().get(NotificationSlot::Startup), None);
    assert_eq!(rig.handle.status().empty_checks, 0);
}

#[tokio::test(start_paused = true)]
async fn join_mid_streak_resets_the_count() {
    let rig = monitoring_rig().await;
    rig.server.set_players(0);

    tokio::time::sleep(Duration::from_secs(42)).await;
    assert_eq!(rig.handle.status().empty_checks, 4);

    rig.server.set_players(2);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(rig.handle.status().empty_checks, 0);
    assert_eq!(rig.posted_containing("within 20 seconds"), 0);
    let startup = rig
        .slot_content(NotificationSlot::Startup)
        .expect("startup slot should be bound");
    assert!(startup.contains("👥 Players online: 2"));

    rig.server.set_players(0);
    eventually("auto stop", || rig.server.stop_calls() == 1).await;
    assert_eq!(rig.posted_containing("within 20 seconds"), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_start_is_announced_and_not_retried() {
    let server = InMemoryGameServer::new();
    server.fail_starts("exit status 1");
    let rig = Rig::spawn(server, settings(GRACE));

    rig.handle
        .request_start()
        .expect("monitor should accept start");
    eventually("start failure", || {
        rig.posted_containing("Failed to start the server: supervisor start failed: exit status 1")
            == 1
    })
    .await;
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(rig.phase(), LifecyclePhase::Stopped);
    assert_eq!(rig.server.start_calls(), 1);
    assert_eq!(rig.store.snapshot().get(NotificationSlot::Startup), None);
}

#[tokio::test(start_paused = true)]
async fn silent_boot_times_out() {
    let server = InMemoryGameServer::new();
    server.set_silent_boot(true);
    let rig = Rig::spawn(server, settings(GRACE));
    let requested_at = Instant::now();

    rig.handle
        .request_start()
        .expect("monitor should accept start");
    eventually("start timeout", || rig.posted_containing("Timed out") == 1).await;

    assert!(requested_at.elapsed() >= Duration::from_secs(300));
    assert_eq!(rig.phase(), LifecyclePhase::Stopped);
    assert_eq!(rig.store.snapshot().get(NotificationSlot::Startup), None);
}

#[rstest]
#[case(LifecyclePhase::AwaitingFirstPlayer)]
#[case(LifecyclePhase::Monitoring)]
#[tokio::test(start_paused = true)]
async fn duplicate_start_is_refused(#[case] phase: LifecyclePhase) {
    let rig = Rig::spawn(InMemoryGameServer::new(), settings(GRACE));
    rig.handle
        .request_start()
        .expect("monitor should accept start");
    eventually("player wait", || {
        rig.phase() == LifecyclePhase::AwaitingFirstPlayer
    })
    .await;
    if phase == LifecyclePhase::Monitoring {
        rig.server.set_players(1);
        eventually("first join", || rig.phase() == LifecyclePhase::Monitoring).await;
    }

    rig.handle
        .request_start()
        .expect("monitor should accept start");
    eventually("refusal", || rig.posted_containing("already up") == 1).await;

    assert_eq!(rig.server.start_calls(), 1);
    assert_eq!(rig.phase(), phase);
}

#[tokio::test(start_paused = true)]
async fn running_server_is_adopted_with_grace_period() {
    let server = InMemoryGameServer::running();
    server.set_details(12, "V 1.0");
    let rig = Rig::spawn(server, settings(Duration::from_secs(60)));
    let spawned_at = Instant::now();

    tokio::time::sleep(Duration::from_secs(65)).await;
    assert_eq!(rig.phase(), LifecyclePhase::GracePeriod);
    assert_eq!(rig.handle.status().empty_checks, 0);
    assert_eq!(
        rig.slot_content(NotificationSlot::Status).as_deref(),
        Some("Online: 0 players\nPing: 12ms\nVersion: V 1.0")
    );
    assert_eq!(rig.posted_containing("Online:"), 1);

    eventually("auto stop", || rig.server.stop_calls() == 1).await;
    assert!(spawned_at.elapsed() >= Duration::from_secs(125));
    assert_eq!(rig.posted_containing("within 20 seconds"), 1);
}

#[tokio::test(start_paused = true)]
async fn crash_while_monitoring_returns_to_stopped() {
    let rig = monitoring_rig().await;

    rig.server.set_running(false);
    eventually("crash detected", || rig.phase() == LifecyclePhase::Stopped).await;

    assert_eq!(
        rig.slot_content(NotificationSlot::Status).as_deref(),
        Some("Server: offline\nStatus: stopped")
    );
    assert_eq!(rig.store.snapshot().get(NotificationSlot::Startup), None);
    assert_eq!(rig.server.stop_calls(), 0);
    assert_eq!(rig.handle.status().empty_checks, 0);
}

#[tokio::test(start_paused = true)]
async fn failed_stop_still_returns_to_stopped() {
    let rig = monitoring_rig().await;
    rig.server.fail_stops("server busy");

    rig.server.set_players(0);
    eventually("stop failure", || rig.posted_containing("Failed to stop") == 1).await;

    assert_eq!(rig.phase(), LifecyclePhase::Stopped);
    assert_eq!(rig.store.snapshot().get(NotificationSlot::Startup), None);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_monitor() {
    let rig = monitoring_rig().await;
    let Rig { handle, server, .. } = rig;
    let status = handle.subscribe();

    handle.shutdown().await.expect("monitor should exit cleanly");
    server.set_players(0);
    tokio::time::sleep(Duration::from_secs(120)).await;

    assert_eq!(server.stop_calls(), 0);
    assert_eq!(status.borrow().phase, LifecyclePhase::Monitoring);
}

#[tokio::test(start_paused = true)]
async fn slow_channel_does_not_delay_auto_stop() {
    let rig = Rig::spawn(InMemoryGameServer::running(), settings(Duration::ZERO));
    rig.channel.set_latency(Duration::from_secs(15));
    let spawned_at = Instant::now();

    eventually("auto stop", || rig.server.stop_calls() == 1).await;

    let elapsed = spawned_at.elapsed();
    assert!(elapsed <= Duration::from_secs(81), "stop lagged: {elapsed:?}");
    eventually("stop announcement", || {
        rig.posted_containing("stopped cleanly") == 1
    })
    .await;
    let warning = rig.position_of("within 20 seconds");
    let stopping = rig.position_of("Stopping the server automatically");
    assert!(warning.is_some());
    assert!(warning < stopping);
}

#[tokio::test(start_paused = true)]
async fn query_racing_a_stop_does_not_readopt_the_server() {
    let server = InMemoryGameServer::running();
    server.set_query_latency(Duration::from_secs(8));
    server.set_stop_latency(Duration::from_secs(5));
    let rig = Rig::spawn(server, settings(Duration::ZERO));

    eventually("auto stop", || {
        rig.server.stop_calls() == 1 && rig.phase() == LifecyclePhase::Stopped
    })
    .await;
    // The query begun before the stop finished answers a few seconds later.
    tokio::time::sleep(Duration::from_secs(6)).await;

    assert_eq!(rig.phase(), LifecyclePhase::Stopped);
    assert!(!rig.server.is_running());
    assert_eq!(rig.handle.status().empty_checks, 0);
}

#[tokio::test(start_paused = true)]
async fn undecodable_answer_while_monitoring_stops_tracking() {
    let rig = monitoring_rig().await;

    rig.server.set_malformed(true);
    eventually("parse failure", || rig.phase() == LifecyclePhase::Stopped).await;

    assert_eq!(
        rig.slot_content(NotificationSlot::Status).as_deref(),
        Some("Server: error\nStatus: status check failed")
    );
    assert_eq!(rig.store.snapshot().get(NotificationSlot::Startup), None);
    assert_eq!(rig.server.stop_calls(), 0);
}

#[tokio::test]
async fn zero_timer_is_refused_at_spawn() {
    let server = Arc::new(InMemoryGameServer::new());
    let sink = NotificationSink::new(
        Arc::new(InMemoryNotificationChannel::new()),
        PersistedHandles::new(Arc::new(InMemoryHandleStore::new())),
    );
    let clock = MonotonicClock::anchored_at(DateTime::<Utc>::UNIX_EPOCH);

    let result = LifecycleMonitor::spawn(
        settings(GRACE).with_wait_player_interval(Duration::ZERO),
        Arc::clone(&server),
        server,
        sink,
        Arc::new(clock),
    );

    assert!(matches!(
        result,
        Err(MonitorError::ZeroTimer("wait player interval"))
    ));
}
