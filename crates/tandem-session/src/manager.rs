//! Session driver: the single owner of the [`SessionMachine`].
//!
//! Ticks from the [`TickSource`] and commands from [`SessionHandle`]s are
//! consumed serially by one task, which forwards machine events to the
//! [`SessionHooks`]. Stopping the handle, dropping every handle, or a hook
//! panicking all tear the task down, and the tick source is released with
//! it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use tandem_core::config::SessionConfig;
use tandem_core::error::AppError;
use tandem_core::result::AppResult;
use tandem_core::traits::LogoutWarning;
use tandem_core::types::SessionStatus;

use crate::activity::ActivityKind;
use crate::machine::{SessionEvent, SessionMachine};
use crate::tick::{Tick, TickSource};

/// Receives the transitions of an idle session.
///
/// Hooks run on the session task, one at a time and in order.
#[async_trait]
pub trait SessionHooks: Send + Sync + 'static {
    /// The session moved to ONLINE or AWAY.
    async fn on_status_change(&self, status: SessionStatus);

    /// The session entered WARNING.
    async fn on_logout_warning(&self, warning: LogoutWarning);

    /// Idle time reached the logout threshold.
    async fn on_logout(&self);
}

#[derive(Debug, Clone, Copy)]
enum SessionCommand {
    Activity(ActivityKind),
    ResetTimer,
}

/// Cloneable control surface of a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    shutdown: Arc<watch::Sender<bool>>,
    status: watch::Receiver<SessionStatus>,
}

impl SessionHandle {
    /// Report an activity signal.
    ///
    /// Never blocks: if the command buffer is full the signal is dropped,
    /// which the throttle would have done anyway.
    pub fn record_activity(&self, kind: ActivityKind) -> AppResult<()> {
        match self.commands.try_send(SessionCommand::Activity(kind)) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::trace!("Activity '{}' dropped, session busy", kind);
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                Err(AppError::session("Session is no longer running"))
            }
        }
    }

    /// Reset the idle timer as if the user had just interacted.
    pub async fn reset_timer(&self) -> AppResult<()> {
        self.commands
            .send(SessionCommand::ResetTimer)
            .await
            .map_err(|_| AppError::session("Session is no longer running"))
    }

    /// Stop the session task and its tick source. Idempotent.
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
    }

    /// Whether the session task is still consuming commands.
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed() && !*self.shutdown.borrow()
    }

    /// Last published session state.
    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }
}

/// Owns the machine, the tick source and the inbound channels.
pub struct SessionManager<H: SessionHooks> {
    machine: SessionMachine,
    ticks: TickSource,
    tick_rx: mpsc::Receiver<Tick>,
    commands: mpsc::Receiver<SessionCommand>,
    shutdown: watch::Receiver<bool>,
    status_tx: watch::Sender<SessionStatus>,
    hooks: Arc<H>,
}

impl<H: SessionHooks> SessionManager<H> {
    /// Validate `config`, then spawn the session task.
    ///
    /// The returned handle controls the session; the join handle resolves
    /// when the task has stopped and released its timer.
    pub fn spawn(
        config: &SessionConfig,
        hooks: Arc<H>,
        command_buffer: usize,
    ) -> AppResult<(SessionHandle, JoinHandle<()>)> {
        let thresholds = config.thresholds()?;

        let (tick_tx, tick_rx) = mpsc::channel(4);
        let (command_tx, command_rx) = mpsc::channel(command_buffer.max(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (status_tx, status_rx) = watch::channel(SessionStatus::Online);

        let manager = Self {
            machine: SessionMachine::new(thresholds, config.activity_throttle(), Instant::now()),
            ticks: TickSource::new(config.tick_interval(), tick_tx),
            tick_rx,
            commands: command_rx,
            shutdown: shutdown_rx,
            status_tx,
            hooks,
        };

        let handle = SessionHandle {
            commands: command_tx,
            shutdown: Arc::new(shutdown_tx),
            status: status_rx,
        };

        tracing::info!(
            away = ?thresholds.away(),
            warning = ?thresholds.warning(),
            logout = ?thresholds.logout(),
            "Starting idle session"
        );

        Ok((handle, tokio::spawn(manager.run())))
    }

    async fn run(mut self) {
        self.ticks.start();

        loop {
            tokio::select! {
                biased;
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
                command = self.commands.recv() => {
                    let Some(command) = command else { break };
                    let now = Instant::now();
                    let event = match command {
                        SessionCommand::Activity(kind) => {
                            tracing::trace!("Activity signal: {}", kind);
                            self.machine.record_activity(now)
                        }
                        SessionCommand::ResetTimer => self.machine.reset_timer(now),
                    };
                    self.dispatch(event).await;
                }
                Some(tick) = self.tick_rx.recv() => {
                    tracing::trace!("Session tick {}", tick.seq);
                    let event = self.machine.tick(Instant::now());
                    self.dispatch(event).await;
                }
            }
        }

        self.ticks.stop();
        tracing::info!("Idle session stopped");
    }

    async fn dispatch(&mut self, event: Option<SessionEvent>) {
        let Some(event) = event else { return };
        self.status_tx.send_replace(self.machine.status());

        match event {
            SessionEvent::StatusChanged(status) => {
                tracing::debug!("Session status changed to {}", status);
                self.hooks.on_status_change(status).await;
            }
            SessionEvent::LogoutWarning(warning) => {
                tracing::debug!("Session logout warning ({:?} left)", warning.visible_for);
                self.hooks.on_logout_warning(warning).await;
            }
            SessionEvent::Logout => {
                tracing::info!("Session idle past logout threshold");
                self.hooks.on_logout().await;
            }
        }
    }
}
