//! Error types for scheduler operations.

use thiserror::Error;

use crate::core::runway::RunwayId;

/// Errors produced by scheduler components.
///
/// All variants are recoverable and local: none of them crashes a worker.
/// An internal ordering violation degrades the pool instead of surfacing
/// through this enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// Submission arrived after shutdown was initiated.
    #[error("admission queue is closed")]
    QueueClosed,
    /// A runway that was already free was released. Logged, non-fatal.
    #[error("runway {0} released while already free")]
    DuplicateRelease(RunwayId),
    /// Runway id outside the configured pool.
    #[error("unknown runway {0}")]
    UnknownRunway(RunwayId),
    /// Unrecognized flight kind string at the input boundary.
    #[error("invalid flight kind `{0}`")]
    InvalidKind(String),
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// `start` was called on a scheduler whose workers are already running.
    #[error("scheduler already started")]
    AlreadyStarted,
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            SchedulerError::DuplicateRelease(3).to_string(),
            "runway 3 released while already free"
        );
        assert_eq!(
            SchedulerError::InvalidKind("cargo".into()).to_string(),
            "invalid flight kind `cargo`"
        );
        assert_eq!(SchedulerError::QueueClosed.to_string(), "admission queue is closed");
    }
}
