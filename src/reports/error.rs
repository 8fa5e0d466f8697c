use thiserror::Error;

/// Failures surfaced by the month/quarter builders.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Caller passed an unusable year or month. No store access was attempted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("store access failed: {0:#}")]
    Store(#[source] anyhow::Error),
}

impl ReportError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
