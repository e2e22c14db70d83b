//! Error taxonomy for the tracker.
//!
//! Store and aggregation functions return `Result<T, TrackerError>`. The
//! [`Tracker`](crate::tracker::Tracker) boundary turns these into reported
//! outcomes instead of letting them terminate the process.

use thiserror::Error;

/// Errors raised by the store, the aggregator and import.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Missing required field: {0}")]
    Validation(String),

    #[error("{0} already exists. Use update-status instead.")]
    Duplicate(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed data file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unexpected header in {file}: expected [{expected}], found [{found}]")]
    Header {
        file: String,
        expected: String,
        found: String,
    },

    #[error("{file} has {skipped} unreadable row(s); refusing to rewrite it")]
    UnsafeRewrite { file: String, skipped: usize },

    #[error("Invalid import data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No data: {0}")]
    NoData(&'static str),

    #[error("Rate is undefined over an empty set")]
    DivisionUndefined,

    #[error("A window of {0} days reaches past the last supported date")]
    WindowOutOfRange(u32),
}

pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = TrackerError::Validation("Industry".to_string());
        assert_eq!(err.to_string(), "Missing required field: Industry");

        let err = TrackerError::UnsafeRewrite {
            file: "engagement_tracker.csv".to_string(),
            skipped: 2,
        };
        assert!(err.to_string().contains("refusing to rewrite"));

        let err = TrackerError::WindowOutOfRange(4_000_000);
        assert!(err.to_string().starts_with("A window of 4000000 days"));
    }
}
