//! In-memory presence store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use tandem_core::result::AppResult;
use tandem_core::traits::PresenceStore;
use tandem_core::types::{UserId, UserStatus};

/// A persisted presence row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceRecord {
    /// Persisted status.
    pub status: UserStatus,
    /// Last heartbeat time.
    pub last_seen: Option<DateTime<Utc>>,
}

/// Presence rows keyed by user, with the server-side heartbeat semantics.
#[derive(Debug, Default)]
pub struct MemoryPresenceStore {
    records: DashMap<UserId, PresenceRecord>,
}

impl MemoryPresenceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a row.
    pub fn get(&self, user_id: UserId) -> Option<PresenceRecord> {
        self.records.get(&user_id).map(|r| *r.value())
    }
}

#[async_trait]
impl PresenceStore for MemoryPresenceStore {
    async fn current_status(&self, user_id: UserId) -> AppResult<Option<UserStatus>> {
        Ok(self.get(user_id).map(|r| r.status))
    }

    async fn update_status(&self, user_id: UserId, status: UserStatus) -> AppResult<()> {
        self.records
            .entry(user_id)
            .and_modify(|r| r.status = status)
            .or_insert(PresenceRecord {
                status,
                last_seen: None,
            });
        Ok(())
    }

    async fn update_heartbeat(
        &self,
        user_id: UserId,
        status: UserStatus,
    ) -> AppResult<DateTime<Utc>> {
        let now = Utc::now();
        self.records
            .entry(user_id)
            .and_modify(|r| {
                if r.status != UserStatus::Invisible {
                    r.status = status;
                }
                r.last_seen = Some(now);
            })
            .or_insert(PresenceRecord {
                status,
                last_seen: Some(now),
            });
        Ok(now)
    }

    async fn logout(&self, user_id: UserId) -> AppResult<()> {
        self.update_status(user_id, UserStatus::Offline).await
    }
}
