//! Collaborator traits defined in `tandem-core` and implemented elsewhere.

pub mod store;
pub mod ui;

pub use store::PresenceStore;
pub use ui::{LogoutWarning, SessionUi};
