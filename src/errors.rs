//! Typed errors for the two core components. The sizing engine and the report
//! store expose these so callers can tell a bad form value apart from a broken
//! database; everything above them (UI, config, export) wraps them in
//! `anyhow` with extra context.

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by [`crate::sizing::compute_sizing`] before any arithmetic
/// runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SizingError {
    /// A numeric input is out of range or the panel wattage is not offered.
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl SizingError {
    pub(crate) fn invalid(
        field: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        SizingError::InvalidInput {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Storage failures surfaced by [`crate::db::ReportStore`]. A missing report is
/// not an error; lookups return `Ok(None)` instead.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to {action}")]
    Storage {
        action: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to prepare storage directory {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The JSON payload column could not be written or read back.
    #[error("failed to {action} report payload")]
    Payload {
        action: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("report payload uses schema version {found}, newest supported is {supported}")]
    UnsupportedSchema { found: u32, supported: u32 },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Attach the attempted action to a raw SQLite error, mirroring how the rest
/// of the codebase uses `anyhow::Context`.
pub(crate) trait StorageContext<T> {
    fn storage(self, action: &'static str) -> StoreResult<T>;
}

impl<T> StorageContext<T> for Result<T, rusqlite::Error> {
    fn storage(self, action: &'static str) -> StoreResult<T> {
        self.map_err(|source| StoreError::Storage { action, source })
    }
}
