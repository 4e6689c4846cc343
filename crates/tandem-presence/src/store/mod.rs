//! [`tandem_core::traits::PresenceStore`] implementations.

pub mod memory;
