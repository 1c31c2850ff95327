use thiserror::Error;

/// Advisory GPU error reported by [`GraphicsApi::take_error`](super::GraphicsApi::take_error).
///
/// These never change control flow on their own; they are logged by
/// [`check_and_log_error`](super::diagnostics::check_and_log_error).
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum GpuError {
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("out of memory: {0}")]
    OutOfMemory(String),
    #[error("internal driver error: {0}")]
    Internal(String),
}

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}
