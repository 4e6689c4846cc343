//! Integration tests for the presence orchestrator driven by the idle
//! session.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use tandem_core::config::PresenceConfig;
use tandem_core::types::{SessionStatus, UserId, UserStatus};
use tandem_presence::{LocalSession, Presence};
use tandem_session::ActivityKind;

use helpers::{
    FlakyStore, RecordingUi, TestPresence, UiEvent, fast_session, sleep_ms, slow_session,
};

#[tokio::test(start_paused = true)]
async fn test_idle_escalation_ends_in_logout() {
    let app = TestPresence::start(fast_session()).await;
    app.local.add_like(uuid::Uuid::new_v4()).await;
    assert_eq!(app.stored_status(), Some(UserStatus::Online));

    sleep_ms(3_500).await;
    assert_eq!(app.stored_status(), Some(UserStatus::Away));
    assert_eq!(app.presence.status().await, UserStatus::Away);

    sleep_ms(3_000).await;
    assert_eq!(
        app.ui.events(),
        vec![UiEvent::ShowWarning(Duration::from_secs(2))]
    );
    assert!(app.presence.snapshot().await.logout_warning_pending);

    sleep_ms(2_000).await;
    assert!(app.presence.is_logged_out());
    assert_eq!(app.stored_status(), Some(UserStatus::Offline));
    assert!(app.local.snapshot().await.is_empty());
    assert_eq!(
        app.ui.events(),
        vec![
            UiEvent::ShowWarning(Duration::from_secs(2)),
            UiEvent::DismissWarning,
            UiEvent::Redirect("/login".to_string()),
        ]
    );

    app.tasks.join().await.expect("tasks stop after logout");
    assert_eq!(app.store.logouts.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_activity_during_warning_restores_online() {
    let app = TestPresence::start(fast_session()).await;

    sleep_ms(6_500).await;
    assert_eq!(
        app.presence.session().map(|s| s.status()),
        Some(SessionStatus::Warning)
    );

    app.presence.record_activity(ActivityKind::PointerMove).unwrap();
    sleep_ms(100).await;

    assert_eq!(app.stored_status(), Some(UserStatus::Online));
    assert_eq!(app.ui.events().last(), Some(&UiEvent::DismissWarning));

    sleep_ms(2_500).await;
    assert!(!app.presence.is_logged_out());
}

#[tokio::test(start_paused = true)]
async fn test_stay_logged_in_cancels_pending_logout() {
    let app = TestPresence::start(fast_session()).await;

    sleep_ms(6_500).await;
    app.presence.stay_logged_in().await.unwrap();
    sleep_ms(100).await;

    assert!(!app.presence.snapshot().await.logout_warning_pending);
    assert_eq!(app.stored_status(), Some(UserStatus::Online));

    sleep_ms(2_500).await;
    assert!(!app.presence.is_logged_out());
}

#[tokio::test(start_paused = true)]
async fn test_invisible_suppresses_idle_updates() {
    let app = TestPresence::start(fast_session()).await;
    app.presence.set_status(UserStatus::Invisible).await.unwrap();

    sleep_ms(3_500).await;
    assert_eq!(app.stored_status(), Some(UserStatus::Invisible));
    assert_eq!(app.presence.status().await, UserStatus::Invisible);

    app.presence.record_activity(ActivityKind::KeyDown).unwrap();
    sleep_ms(100).await;
    assert_eq!(app.stored_status(), Some(UserStatus::Invisible));
}

#[tokio::test(start_paused = true)]
async fn test_choosing_online_resumes_reconciliation() {
    let app = TestPresence::start(fast_session()).await;
    app.presence.set_status(UserStatus::Offline).await.unwrap();
    app.presence.set_status(UserStatus::Online).await.unwrap();

    sleep_ms(3_500).await;
    assert_eq!(app.stored_status(), Some(UserStatus::Away));
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_cadence_and_offline_skip() {
    let app = TestPresence::start(slow_session()).await;

    sleep_ms(100).await;
    assert_eq!(app.store.heartbeat_count(), 1);
    assert!(app.presence.snapshot().await.last_heartbeat.is_some());

    sleep_ms(10_000).await;
    assert_eq!(app.store.heartbeat_count(), 3);

    app.presence.set_status(UserStatus::Offline).await.unwrap();
    sleep_ms(20_000).await;
    assert_eq!(app.store.heartbeat_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_keeps_invisible_and_refreshes_last_seen() {
    let app = TestPresence::start(slow_session()).await;
    app.presence.set_status(UserStatus::Invisible).await.unwrap();

    sleep_ms(5_500).await;

    let record = app.store.inner.get(app.user_id).unwrap();
    assert_eq!(record.status, UserStatus::Invisible);
    assert!(record.last_seen.is_some());
    assert_eq!(app.store.heartbeat_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_store_does_not_block_logout() {
    let store = Arc::new(FlakyStore::default());
    let app = TestPresence::start_with(fast_session(), store).await;
    app.store.fail(true);

    sleep_ms(9_000).await;

    assert!(app.presence.is_logged_out());
    assert!(app.local.snapshot().await.is_empty());
    assert_eq!(
        app.ui.events().last(),
        Some(&UiEvent::Redirect("/login".to_string()))
    );
    // The store never learned about the idle transitions.
    assert_eq!(app.stored_status(), Some(UserStatus::Online));
}

#[tokio::test(start_paused = true)]
async fn test_close_stops_without_logging_out() {
    let app = TestPresence::start(fast_session()).await;

    sleep_ms(1_500).await;
    app.presence.close();
    app.tasks.join().await.unwrap();

    sleep_ms(30_000).await;
    assert!(!app.presence.is_logged_out());
    assert!(app.ui.events().is_empty());
    assert_eq!(app.store.inner.get(app.user_id).map(|r| r.status), Some(UserStatus::Online));
    assert_eq!(app.presence.snapshot().await.session, None);
}

#[tokio::test(start_paused = true)]
async fn test_start_twice_is_rejected() {
    let app = TestPresence::start(slow_session()).await;

    assert!(app.presence.start(&slow_session()).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_sign_in_keeps_stored_invisible() {
    let store = Arc::new(FlakyStore::default());
    let app = TestPresence::start_with(slow_session(), store).await;
    app.presence.set_status(UserStatus::Invisible).await.unwrap();
    app.presence.close();

    let again = Presence::new(
        app.user_id,
        Default::default(),
        app.store.clone(),
        app.ui.clone(),
        app.local.clone(),
    );
    let _tasks = again.start(&slow_session()).await.unwrap();

    assert_eq!(again.status().await, UserStatus::Invisible);
    assert_eq!(app.stored_status(), Some(UserStatus::Invisible));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_presence_stops_everything() {
    let TestPresence {
        presence,
        store,
        ui,
        tasks,
        ..
    } = TestPresence::start(fast_session()).await;

    sleep_ms(100).await;
    let heartbeats = store.heartbeat_count();

    drop(presence);
    tasks.join().await.expect("tasks stop once presence is dropped");

    sleep_ms(20_000).await;
    assert_eq!(store.heartbeat_count(), heartbeats);
    assert_eq!(store.logouts.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert!(ui.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_start_has_no_side_effects() {
    let user_id = UserId::new();
    let store = Arc::new(FlakyStore::default());
    let local = Arc::new(LocalSession::new());
    let presence = Presence::new(
        user_id,
        PresenceConfig::default(),
        store.clone(),
        Arc::new(RecordingUi::default()),
        local.clone(),
    );

    let mut misordered = fast_session();
    misordered.warning_timeout_ms = 1;

    assert!(presence.start(&misordered).await.is_err());
    assert_eq!(store.inner.get(user_id), None);
    assert!(local.snapshot().await.is_empty());
    assert!(presence.session().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_logout_waits_for_inflight_heartbeat() {
    let store = Arc::new(FlakyStore::default());
    store.delay_heartbeats(1_000);
    let app = TestPresence::start_with(slow_session(), store).await;

    // The first heartbeat is now parked inside the store.
    sleep_ms(100).await;
    app.presence.logout().await;
    sleep_ms(2_000).await;

    assert_eq!(app.store.heartbeat_count(), 1);
    assert_eq!(app.stored_status(), Some(UserStatus::Offline));
}
