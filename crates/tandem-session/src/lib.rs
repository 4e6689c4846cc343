//! # tandem-session
//!
//! Idle session lifecycle for a signed-in Tandem client:
//!
//! - [`tick::TickSource`]: a one-second cadence running on its own task
//! - [`activity::ActivityTracker`]: throttled last-activity bookkeeping
//! - [`machine::SessionMachine`]: the ONLINE → AWAY → WARNING → LOGOUT
//!   escalation, recomputed from absolute timestamps on every tick
//! - [`manager::SessionManager`]: the single owner task that feeds ticks
//!   and activity into the machine and forwards events to [`SessionHooks`]

pub mod activity;
pub mod machine;
pub mod manager;
pub mod tick;

pub use activity::{ActivityKind, ActivityTracker};
pub use machine::{SessionEvent, SessionMachine};
pub use manager::{SessionHandle, SessionHooks, SessionManager};
pub use tick::{Tick, TickSource};
