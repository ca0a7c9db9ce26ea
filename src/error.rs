use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the timeline engine and its persistence layer.
///
/// Stale task ids and rejected resize candidates are not errors; those paths
/// return `None` or do nothing.
#[derive(Debug, Error)]
pub enum TimelineError {
    /// Month columns have no fixed width; a month must be named.
    #[error("month view width requested without a reference date")]
    MissingReferenceDate,
    /// A move or resize is already active.
    #[error("a {0} gesture is already in progress")]
    GestureInProgress(&'static str),
    /// A user-entered visible range was rejected.
    #[error("end date must be after start date")]
    RangeNotIncreasing,
    #[error("date range must be at least {0} days")]
    RangeTooShort(i64),
    #[error("date range cannot exceed {0} years")]
    RangeTooLong(u32),
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no home directory available for application data")]
    NoDataDir,
}

pub type Result<T, E = TimelineError> = std::result::Result<T, E>;
