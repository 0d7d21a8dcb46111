//! Common error types for CardScan

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for CardScan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds surfaced to callers
///
/// Batch-level price fetch failures are not represented here; they are
/// absorbed by the fetch engine as unresolved prices.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON in a persisted file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed card identity
    #[error("Validation error: {0}")]
    Validation(String),

    /// Promotion attempted without a current snapshot
    #[error("Current snapshot file is missing - cannot promote to baseline")]
    MissingCurrent,

    /// Baseline required but not present
    #[error("Baseline file is missing - cannot generate report")]
    MissingBaseline,

    /// Atomic write failed; the previously committed file is untouched
    #[error("Failed to persist {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Process exit code for the command line front end
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MissingCurrent => 2,
            Error::MissingBaseline => 3,
            Error::Validation(_) => 4,
            Error::Config(_) => 5,
            Error::Persistence { .. } | Error::Io(_) | Error::Json(_) => 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_kind() {
        let codes = [
            Error::MissingCurrent.exit_code(),
            Error::MissingBaseline.exit_code(),
            Error::Validation("name".into()).exit_code(),
            Error::Config("bad".into()).exit_code(),
            Error::Persistence {
                path: PathBuf::from("baseline.json"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            }
            .exit_code(),
        ];

        let mut unique = codes.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), codes.len());
        assert!(codes.iter().all(|c| *c != 0 && *c != 1));
    }

    #[test]
    fn test_persistence_message_names_path() {
        let err = Error::Persistence {
            path: PathBuf::from("/data/current.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/current.json"));
        assert!(msg.contains("denied"));
    }
}
