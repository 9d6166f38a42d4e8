//! # Error Handling
//!
//! Crate-level error types for the profilesync agent. Stage-specific errors
//! (config store, secrets store, profile parsing) live next to the code that
//! produces them and convert into [`ProfileSyncError`] at the agent boundary.

pub mod types;

pub use types::{ProfileSyncError, Result};
