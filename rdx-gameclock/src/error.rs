//! Error types for the clock engine.
//!
//! Runtime misuse of a clock (pushing out of turn, pausing a stopped clock)
//! is never an error; these only cover construction and configuration.

use thiserror::Error;

/// Errors raised while building a clock or loading its configuration.
#[derive(Debug, Error)]
pub enum ClockError {
    /// A stage table must contain at least the initial stage.
    #[error("a time control needs at least one stage")]
    EmptyStages,

    /// Ticks cannot be scheduled with a zero period.
    #[error("update interval must be a positive number of milliseconds")]
    InvalidUpdateInterval,

    /// The tokio tick source was created outside of a runtime.
    #[error("no tokio runtime is available to drive clock ticks")]
    NoRuntime,

    /// A preset name was not found in the registry.
    #[error("unknown preset: '{0}'")]
    UnknownPreset(String),

    /// Reading or deserializing a configuration source failed.
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}
