//! # tandem-core
//!
//! Core crate for Tandem presence. Contains configuration schemas, the
//! unified error system, presence status types, typed identifiers and
//! the traits implemented by the persistence and UI collaborators.
//!
//! This crate has **no** internal dependencies on other Tandem crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
