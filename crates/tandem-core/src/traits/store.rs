//! Persistence collaborator for user presence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::result::AppResult;
use crate::types::{UserId, UserStatus};

/// Server-side owner of the persisted [`UserStatus`] and last-seen time.
///
/// The presence orchestrator calls these fire-and-forget: failures are
/// logged by the caller and never retried.
#[async_trait]
pub trait PresenceStore: Send + Sync + std::fmt::Debug + 'static {
    /// Read the persisted status. `None` if the user has no presence row yet.
    async fn current_status(&self, user_id: UserId) -> AppResult<Option<UserStatus>>;

    /// Overwrite the persisted status.
    async fn update_status(&self, user_id: UserId, status: UserStatus) -> AppResult<()>;

    /// Refresh last-seen and push the status.
    ///
    /// When the persisted status is [`UserStatus::Invisible`] only last-seen
    /// is refreshed. Returns the last-seen time that was recorded.
    async fn update_heartbeat(
        &self,
        user_id: UserId,
        status: UserStatus,
    ) -> AppResult<DateTime<Utc>>;

    /// Mark the user as signed out.
    async fn logout(&self, user_id: UserId) -> AppResult<()>;
}
