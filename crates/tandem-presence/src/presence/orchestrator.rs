//! Presence orchestrator: reconciles the idle session with the persisted
//! user status, drives the heartbeat and performs logout.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;

use tandem_core::config::{PresenceConfig, SessionConfig};
use tandem_core::error::AppError;
use tandem_core::result::AppResult;
use tandem_core::traits::{LogoutWarning, PresenceStore, SessionUi};
use tandem_core::types::{SessionStatus, UserId, UserStatus};
use tandem_session::{ActivityKind, SessionHandle, SessionHooks, SessionManager};

use crate::heartbeat;
use crate::presence::local::LocalSession;

/// Point-in-time view of a user's presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceSnapshot {
    /// The tracked user.
    pub user_id: UserId,
    /// Authoritative local status.
    pub status: UserStatus,
    /// Idle session state, `None` once the session stopped.
    pub session: Option<SessionStatus>,
    /// Whether the logout warning is showing.
    pub logout_warning_pending: bool,
    /// Last successful heartbeat.
    pub last_heartbeat: Option<DateTime<Utc>>,
}

/// Background tasks spawned by [`Presence::start`].
#[derive(Debug)]
pub struct PresenceTasks {
    /// The idle session task.
    pub session: JoinHandle<()>,
    /// The heartbeat task.
    pub heartbeat: JoinHandle<()>,
}

impl PresenceTasks {
    /// Wait for both tasks to finish. A panicking hook surfaces here.
    pub async fn join(self) -> AppResult<()> {
        let (session, heartbeat) = tokio::join!(self.session, self.heartbeat);
        session.map_err(|e| AppError::internal(format!("Session task failed: {e}")))?;
        heartbeat.map_err(|e| AppError::internal(format!("Heartbeat task failed: {e}")))?;
        Ok(())
    }
}

/// Owns the authoritative status of one signed-in user.
#[derive(Debug)]
pub struct Presence {
    user_id: UserId,
    config: PresenceConfig,
    store: Arc<dyn PresenceStore>,
    ui: Arc<dyn SessionUi>,
    local: Arc<LocalSession>,
    status: RwLock<UserStatus>,
    last_heartbeat: RwLock<Option<DateTime<Utc>>>,
    warning_pending: AtomicBool,
    logged_out: AtomicBool,
    session: OnceLock<SessionHandle>,
    shutdown: watch::Sender<bool>,
}

impl Presence {
    /// Create an orchestrator. Nothing runs until [`Presence::start`].
    pub fn new(
        user_id: UserId,
        config: PresenceConfig,
        store: Arc<dyn PresenceStore>,
        ui: Arc<dyn SessionUi>,
        local: Arc<LocalSession>,
    ) -> Arc<Self> {
        let (shutdown, _) = watch::channel(false);
        Arc::new(Self {
            user_id,
            config,
            store,
            ui,
            local,
            status: RwLock::new(UserStatus::Online),
            last_heartbeat: RwLock::new(None),
            warning_pending: AtomicBool::new(false),
            logged_out: AtomicBool::new(false),
            session: OnceLock::new(),
            shutdown,
        })
    }

    /// The tracked user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Sign in: settle the initial status, start the idle session and the
    /// heartbeat.
    ///
    /// The background tasks only hold weak references: dropping the last
    /// `Arc<Presence>` stops them.
    pub async fn start(self: &Arc<Self>, session_config: &SessionConfig) -> AppResult<PresenceTasks> {
        if self.session.get().is_some() {
            return Err(AppError::session("Presence already started"));
        }
        session_config.thresholds()?;

        let initial = self.sign_in_status().await;
        *self.status.write().await = initial;
        self.local.set_current_user(self.user_id).await;

        let hooks = Arc::new(PresenceHooks {
            presence: Arc::downgrade(self),
        });
        let (handle, session_task) =
            SessionManager::spawn(session_config, hooks, self.config.command_buffer)?;
        if self.session.set(handle.clone()).is_err() {
            handle.stop();
            return Err(AppError::session("Presence already started"));
        }

        let heartbeat_task = tokio::spawn(heartbeat::run_heartbeat(
            Arc::downgrade(self),
            self.config.heartbeat_interval(),
            self.shutdown.subscribe(),
        ));

        tracing::info!(user_id = %self.user_id, status = %initial, "Presence started");

        Ok(PresenceTasks {
            session: session_task,
            heartbeat: heartbeat_task,
        })
    }

    /// The idle session handle, once started.
    pub fn session(&self) -> Option<&SessionHandle> {
        self.session.get()
    }

    /// Forward a user interaction to the idle session.
    pub fn record_activity(&self, kind: ActivityKind) -> AppResult<()> {
        self.running_session()?.record_activity(kind)
    }

    /// The logout warning's action: hide the notice and reset the idle timer.
    pub async fn stay_logged_in(&self) -> AppResult<()> {
        self.clear_warning();
        self.running_session()?.reset_timer().await
    }

    /// Manually choose a status.
    ///
    /// `Invisible` and `Offline` suppress automatic idle updates until the
    /// user picks `Online` or `Away` again.
    pub async fn set_status(&self, status: UserStatus) -> AppResult<()> {
        if self.logged_out.load(Ordering::SeqCst) {
            return Err(AppError::session("Cannot change status after logout"));
        }

        *self.status.write().await = status;
        tracing::info!(user_id = %self.user_id, status = %status, "Status set manually");

        self.store
            .update_status(self.user_id, status)
            .await
            .inspect_err(|e| tracing::warn!("Failed to persist status {}: {}", status, e))
    }

    /// Authoritative local status.
    pub async fn status(&self) -> UserStatus {
        *self.status.read().await
    }

    /// Point-in-time view of this user's presence.
    pub async fn snapshot(&self) -> PresenceSnapshot {
        PresenceSnapshot {
            user_id: self.user_id,
            status: *self.status.read().await,
            session: self
                .session
                .get()
                .filter(|h| h.is_running())
                .map(|h| h.status()),
            logout_warning_pending: self.warning_pending.load(Ordering::SeqCst),
            last_heartbeat: *self.last_heartbeat.read().await,
        }
    }

    /// Send one heartbeat. Skipped while `Offline`.
    ///
    /// The status lock is held for the whole call so `logout` cannot reach
    /// the store while a heartbeat is in flight.
    pub async fn heartbeat(&self) {
        let status = self.status.read().await;
        if *status == UserStatus::Offline {
            tracing::trace!("Heartbeat skipped for offline user {}", self.user_id);
            return;
        }

        match self.store.update_heartbeat(self.user_id, *status).await {
            Ok(seen) => *self.last_heartbeat.write().await = Some(seen),
            Err(e) => tracing::warn!("Heartbeat failed for user {}: {}", self.user_id, e),
        }
    }

    /// Log out: notify the store, then unconditionally clear local state
    /// and redirect. Only the first call has any effect.
    pub async fn logout(&self) {
        if self.logged_out.swap(true, Ordering::SeqCst) {
            return;
        }

        tracing::info!(user_id = %self.user_id, "Logging out");
        self.stop_tasks();

        // Waits out an in-flight heartbeat; later ones see Offline and skip.
        *self.status.write().await = UserStatus::Offline;

        if let Err(e) = self.store.logout(self.user_id).await {
            tracing::warn!("Logout call failed for user {}: {}", self.user_id, e);
        }

        self.clear_warning();
        self.local.clear().await;
        self.ui.redirect(&self.config.logout_redirect);
    }

    /// Tear down without logging out (navigation away, shutdown).
    pub fn close(&self) {
        tracing::debug!("Closing presence for user {}", self.user_id);
        self.stop_tasks();
    }

    /// Whether [`Presence::logout`] has run.
    pub fn is_logged_out(&self) -> bool {
        self.logged_out.load(Ordering::SeqCst)
    }

    async fn sign_in_status(&self) -> UserStatus {
        let stored = match self.store.current_status(self.user_id).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Failed to read status for user {}: {}", self.user_id, e);
                None
            }
        };

        if stored == Some(UserStatus::Invisible) {
            return UserStatus::Invisible;
        }

        if let Err(e) = self
            .store
            .update_status(self.user_id, UserStatus::Online)
            .await
        {
            tracing::warn!("Failed to mark user {} online: {}", self.user_id, e);
        }
        UserStatus::Online
    }

    /// Apply an idle transition unless a manual status overrides it.
    async fn reconcile(&self, status: SessionStatus) {
        if status == SessionStatus::Online {
            self.clear_warning();
        }

        let Some(next) = status.as_user_status() else {
            return;
        };
        if self.is_logged_out() {
            return;
        }

        {
            let mut current = self.status.write().await;
            if current.is_manual_override() {
                tracing::debug!("Keeping manual status {} over idle {}", *current, status);
                return;
            }
            *current = next;
        }

        if let Err(e) = self.store.update_status(self.user_id, next).await {
            tracing::warn!("Failed to push status {} for user {}: {}", next, self.user_id, e);
        }
    }

    fn running_session(&self) -> AppResult<&SessionHandle> {
        self.session
            .get()
            .ok_or_else(|| AppError::session("Presence not started"))
    }

    fn stop_tasks(&self) {
        self.shutdown.send_replace(true);
        if let Some(handle) = self.session.get() {
            handle.stop();
        }
    }

    fn clear_warning(&self) {
        if self.warning_pending.swap(false, Ordering::SeqCst) {
            self.ui.dismiss_logout_warning();
        }
    }
}

impl Drop for Presence {
    fn drop(&mut self) {
        self.stop_tasks();
    }
}

/// Session hooks that forward to a [`Presence`] without keeping it alive.
struct PresenceHooks {
    presence: Weak<Presence>,
}

#[async_trait]
impl SessionHooks for PresenceHooks {
    async fn on_status_change(&self, status: SessionStatus) {
        if let Some(presence) = self.presence.upgrade() {
            presence.reconcile(status).await;
        }
    }

    async fn on_logout_warning(&self, warning: LogoutWarning) {
        if let Some(presence) = self.presence.upgrade() {
            presence.warning_pending.store(true, Ordering::SeqCst);
            presence.ui.show_logout_warning(warning);
        }
    }

    async fn on_logout(&self) {
        if let Some(presence) = self.presence.upgrade() {
            presence.logout().await;
        }
    }
}
