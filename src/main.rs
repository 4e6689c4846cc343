//! Tandem presence agent.
//!
//! Wires the idle session and presence orchestrator for one signed-in
//! user. Activity signals are read from stdin, one DOM event name per line
//! (`pointermove`, `keydown`, ...). `stay` (or `reset`) resets the idle timer,
//! `status` prints a snapshot, `status <name>` sets a manual status and
//! `logout` signs out.

use std::io::BufRead;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, fmt};

use tandem_core::config::AppConfig;
use tandem_core::error::AppError;
use tandem_core::traits::{LogoutWarning, SessionUi};
use tandem_core::types::{UserId, UserStatus};
use tandem_presence::{LocalSession, MemoryPresenceStore, Presence, PresenceTasks};
use tandem_session::ActivityKind;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Presence agent error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("TANDEM_CONFIG").unwrap_or_else(|_| "config/default".to_string());
    AppConfig::load(&config_path)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// UI surface that reports notices and navigation through the log.
#[derive(Debug)]
struct TerminalUi;

impl SessionUi for TerminalUi {
    fn show_logout_warning(&self, warning: LogoutWarning) {
        tracing::warn!(
            "You will be logged out in {}s due to inactivity. Type 'stay' to remain signed in.",
            warning.visible_for.as_secs()
        );
    }

    fn dismiss_logout_warning(&self) {
        tracing::info!("Logout warning dismissed");
    }

    fn redirect(&self, route: &str) {
        tracing::info!("Redirecting to '{}'", route);
    }
}

/// Main run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Tandem presence agent v{}", env!("CARGO_PKG_VERSION"));

    let user_id = match std::env::var("TANDEM_USER_ID") {
        Ok(raw) => raw
            .parse::<UserId>()
            .map_err(|e| AppError::validation(format!("Invalid TANDEM_USER_ID '{raw}': {e}")))?,
        Err(_) => UserId::new(),
    };

    let store = Arc::new(MemoryPresenceStore::new());
    let local = Arc::new(LocalSession::new());
    let presence = Presence::new(
        user_id,
        config.presence.clone(),
        store,
        Arc::new(TerminalUi),
        local,
    );

    let tasks = presence.start(&config.session).await?;
    tracing::info!("Signed in as {}", presence.user_id());

    serve(presence, tasks, spawn_stdin_reader(), shutdown_signal()).await?;

    tracing::info!("Tandem presence agent stopped");
    Ok(())
}

/// Drive the presence until it logs out or `shutdown` resolves.
///
/// Each input line is handled to completion before the loop looks at the
/// tasks again. Returns once the tasks finish, even if the input source
/// still has a read pending.
async fn serve(
    presence: Arc<Presence>,
    tasks: PresenceTasks,
    mut lines: mpsc::Receiver<String>,
    shutdown: impl Future<Output = ()>,
) -> Result<(), AppError> {
    let join = tasks.join();
    tokio::pin!(join);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received, closing presence...");
                presence.close();
                return (&mut join).await;
            }
            result = &mut join => return result,
            Some(line) = lines.recv() => handle_line(&presence, line.trim()).await,
        }
    }
}

/// Read stdin on a plain OS thread so a pending read never holds up
/// runtime shutdown.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);

    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });

    rx
}

async fn handle_line(presence: &Presence, line: &str) {
    let mut parts = line.split_whitespace();
    let result = match (parts.next(), parts.next()) {
        (None, _) => Ok(()),
        (Some("stay" | "reset"), None) => presence.stay_logged_in().await,
        (Some("logout"), None) => {
            presence.logout().await;
            Ok(())
        }
        (Some("status"), None) => serde_json::to_string(&presence.snapshot().await)
            .map(|json| tracing::info!("{}", json))
            .map_err(AppError::from),
        (Some("status"), Some(name)) => match UserStatus::parse(name) {
            Some(status) => presence.set_status(status).await,
            None => Err(AppError::validation(format!("Unknown status '{name}'"))),
        },
        (Some(event), None) => match ActivityKind::from_event_name(event) {
            Some(kind) => presence.record_activity(kind),
            None => Err(AppError::validation(format!("Unknown command '{event}'"))),
        },
        (Some(_), Some(_)) => Err(AppError::validation(format!("Unknown command '{line}'"))),
    };

    if let Err(e) = result {
        tracing::warn!("{}", e);
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
