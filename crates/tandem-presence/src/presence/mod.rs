//! User presence orchestration.

pub mod local;
pub mod orchestrator;

pub use orchestrator::Presence;
