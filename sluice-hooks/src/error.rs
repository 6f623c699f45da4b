//! Error types for the hook dispatch engine.

use thiserror::Error;

/// Errors surfaced by the hook engine and its peripheral surface.
///
/// Only [`HookError::NilContext`] and [`HookError::CastFailed`] can be
/// returned from a dispatch run. Errors produced by individual callbacks are
/// logged and handled through the verification policy instead of being
/// propagated to the caller.
#[derive(Debug, Error)]
pub enum HookError {
    /// The caller passed no cancellation scope.
    #[error("no cancellation scope was provided")]
    NilContext,

    /// The native payload could not be encoded into the structured form.
    #[error("failed to cast native payload into structured form: {0}")]
    CastFailed(String),

    /// A command hook exceeded its deadline.
    #[error("hook execution timed out")]
    Timeout,

    /// A command hook was cancelled through its scope.
    #[error("hook execution cancelled")]
    Cancelled,

    /// A command hook process could not be spawned or driven.
    #[error("failed to spawn hook process: {0}")]
    SpawnFailed(#[from] std::io::Error),

    /// A command hook produced output that is not a structured payload.
    #[error("failed to parse hook output: {0}")]
    ParseFailed(String),

    /// The hooks configuration file is invalid.
    #[error("hook configuration error: {0}")]
    ConfigError(String),
}

impl HookError {
    /// Check if this error indicates cancellation or a missed deadline.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Timeout)
    }
}
