//! Session-derived client state cleared on logout.

use tokio::sync::RwLock;
use uuid::Uuid;

use tandem_core::types::UserId;

/// Everything the client cached for the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalSessionData {
    /// The signed-in user.
    pub current_user: Option<UserId>,
    /// Profiles loaded into the discovery deck.
    pub profiles: Vec<Uuid>,
    /// Mutual matches.
    pub matches: Vec<Uuid>,
    /// Profiles the user liked.
    pub likes: Vec<Uuid>,
}

impl LocalSessionData {
    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.current_user.is_none()
            && self.profiles.is_empty()
            && self.matches.is_empty()
            && self.likes.is_empty()
    }
}

/// Shared holder for [`LocalSessionData`].
#[derive(Debug, Default)]
pub struct LocalSession {
    data: RwLock<LocalSessionData>,
}

impl LocalSession {
    /// Create an empty local session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the signed-in user.
    pub async fn set_current_user(&self, user_id: UserId) {
        self.data.write().await.current_user = Some(user_id);
    }

    /// Replace the discovery deck.
    pub async fn set_profiles(&self, profiles: Vec<Uuid>) {
        self.data.write().await.profiles = profiles;
    }

    /// Record a like.
    pub async fn add_like(&self, profile_id: Uuid) {
        let mut data = self.data.write().await;
        if !data.likes.contains(&profile_id) {
            data.likes.push(profile_id);
        }
    }

    /// Record a match.
    pub async fn add_match(&self, profile_id: Uuid) {
        let mut data = self.data.write().await;
        if !data.matches.contains(&profile_id) {
            data.matches.push(profile_id);
        }
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> LocalSessionData {
        self.data.read().await.clone()
    }

    /// Drop everything.
    pub async fn clear(&self) {
        *self.data.write().await = LocalSessionData::default();
    }
}
