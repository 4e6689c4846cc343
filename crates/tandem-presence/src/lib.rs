//! # tandem-presence
//!
//! Presence orchestration for a signed-in Tandem client. Provides:
//!
//! - Reconciliation of idle-session transitions with the persisted status
//! - Manual status overrides (invisible / appear offline)
//! - The logout warning notice and the `stay logged in` escape hatch
//! - Best-effort logout that always clears local state and redirects
//! - A fixed-interval heartbeat keeping last-seen fresh
//! - An in-memory [`store::memory::MemoryPresenceStore`]

pub mod heartbeat;
pub mod presence;
pub mod store;

pub use presence::local::LocalSession;
pub use presence::orchestrator::{Presence, PresenceSnapshot, PresenceTasks};
pub use store::memory::MemoryPresenceStore;
