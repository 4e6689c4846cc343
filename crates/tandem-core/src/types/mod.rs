//! Shared domain types.

pub mod id;
pub mod status;

pub use id::UserId;
pub use status::{SessionStatus, UserStatus};
