//! UI collaborator: notices and navigation.

use std::time::Duration;

/// The dismissible notice shown before an idle logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoutWarning {
    /// How long the notice stays visible; equal to the countdown to logout.
    pub visible_for: Duration,
}

/// Host UI surface the presence orchestrator drives.
pub trait SessionUi: Send + Sync + std::fmt::Debug + 'static {
    /// Show the logout warning. Its action should call `stay_logged_in`.
    fn show_logout_warning(&self, warning: LogoutWarning);

    /// Remove the logout warning if it is showing.
    fn dismiss_logout_warning(&self);

    /// Force navigation to `route`.
    fn redirect(&self, route: &str);
}
