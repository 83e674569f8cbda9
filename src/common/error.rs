//! Error types for the emitter
//!
//! # Design Principles (KISS)
//! - Construction-time validation instead of undefined behavior
//! - Sink delivery failures surface as a single variant; no retries
//! - Use thiserror for ergonomic error handling

use thiserror::Error;

/// Errors raised by `OrderedEmitter`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmitterError {
    /// Emission threshold must be at least 1
    #[error("Invalid emit threshold: must be greater than zero")]
    InvalidThreshold,

    /// Sink refused an event (receiver dropped); the event was discarded
    #[error("Sink closed: emitted event was dropped")]
    SinkClosed,
}

/// Result type alias using EmitterError
pub type EmitterResult<T> = Result<T, EmitterError>;
