//! Typed simulation errors.
//!
//! Orchestration code propagates these through `anyhow`, so callers that need
//! to tell them apart can `downcast_ref::<SimError>()`.

/// Errors raised by the simulation core.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum SimError {
    /// Nearest-food lookup was attempted against an empty food set.
    #[error("nearest-food lookup on an empty food set")]
    EmptyFoodSet,

    /// A configuration value is out of range or inconsistent with another.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
