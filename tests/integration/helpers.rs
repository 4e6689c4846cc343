//! Shared test helpers for integration tests.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use tandem_core::config::{PresenceConfig, SessionConfig};
use tandem_core::error::AppError;
use tandem_core::result::AppResult;
use tandem_core::traits::{LogoutWarning, PresenceStore, SessionUi};
use tandem_core::types::{UserId, UserStatus};
use tandem_presence::{LocalSession, MemoryPresenceStore, Presence, PresenceTasks};

/// What the orchestrator asked the UI to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ShowWarning(Duration),
    DismissWarning,
    Redirect(String),
}

/// UI collaborator that records every call.
#[derive(Debug, Default)]
pub struct RecordingUi {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingUi {
    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl SessionUi for RecordingUi {
    fn show_logout_warning(&self, warning: LogoutWarning) {
        self.events
            .lock()
            .unwrap()
            .push(UiEvent::ShowWarning(warning.visible_for));
    }

    fn dismiss_logout_warning(&self) {
        self.events.lock().unwrap().push(UiEvent::DismissWarning);
    }

    fn redirect(&self, route: &str) {
        self.events
            .lock()
            .unwrap()
            .push(UiEvent::Redirect(route.to_string()));
    }
}

/// Memory store that counts calls and can be switched to fail.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: MemoryPresenceStore,
    pub failing: AtomicBool,
    pub heartbeats: AtomicUsize,
    pub logouts: AtomicUsize,
    pub heartbeat_delay_ms: AtomicU64,
}

impl FlakyStore {
    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn delay_heartbeats(&self, ms: u64) {
        self.heartbeat_delay_ms.store(ms, Ordering::SeqCst);
    }

    pub fn heartbeat_count(&self) -> usize {
        self.heartbeats.load(Ordering::SeqCst)
    }

    fn check(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::external_service("presence store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl PresenceStore for FlakyStore {
    async fn current_status(&self, user_id: UserId) -> AppResult<Option<UserStatus>> {
        self.check()?;
        self.inner.current_status(user_id).await
    }

    async fn update_status(&self, user_id: UserId, status: UserStatus) -> AppResult<()> {
        self.check()?;
        self.inner.update_status(user_id, status).await
    }

    async fn update_heartbeat(
        &self,
        user_id: UserId,
        status: UserStatus,
    ) -> AppResult<chrono::DateTime<chrono::Utc>> {
        let delay = self.heartbeat_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.check()?;
        self.heartbeats.fetch_add(1, Ordering::SeqCst);
        self.inner.update_heartbeat(user_id, status).await
    }

    async fn logout(&self, user_id: UserId) -> AppResult<()> {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.logout(user_id).await
    }
}

/// Short thresholds: away 3s, warning 6s, logout 8s.
pub fn fast_session() -> SessionConfig {
    SessionConfig {
        away_timeout_ms: 3_000,
        warning_timeout_ms: 6_000,
        logout_timeout_ms: 8_000,
        tick_interval_ms: 1_000,
        activity_throttle_ms: 1_000,
    }
}

/// Thresholds long enough that nothing escalates during a test.
pub fn slow_session() -> SessionConfig {
    SessionConfig {
        away_timeout_ms: 600_000,
        warning_timeout_ms: 900_000,
        logout_timeout_ms: 930_000,
        tick_interval_ms: 1_000,
        activity_throttle_ms: 1_000,
    }
}

/// A started presence with recording collaborators.
pub struct TestPresence {
    pub user_id: UserId,
    pub presence: Arc<Presence>,
    pub store: Arc<FlakyStore>,
    pub ui: Arc<RecordingUi>,
    pub local: Arc<LocalSession>,
    pub tasks: PresenceTasks,
}

impl TestPresence {
    pub async fn start(session: SessionConfig) -> Self {
        Self::start_with(session, Arc::new(FlakyStore::default())).await
    }

    pub async fn start_with(session: SessionConfig, store: Arc<FlakyStore>) -> Self {
        let user_id = UserId::new();
        let ui = Arc::new(RecordingUi::default());
        let local = Arc::new(LocalSession::new());
        let config = PresenceConfig {
            heartbeat_interval_seconds: 5,
            logout_redirect: "/login".to_string(),
            command_buffer: 16,
        };

        let presence = Presence::new(user_id, config, store.clone(), ui.clone(), local.clone());
        let tasks = presence
            .start(&session)
            .await
            .expect("presence should start");

        Self {
            user_id,
            presence,
            store,
            ui,
            local,
            tasks,
        }
    }

    pub fn stored_status(&self) -> Option<UserStatus> {
        self.store.inner.get(self.user_id).map(|r| r.status)
    }
}

pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
