//! Error types for skyfuel-store.

use std::path::PathBuf;

/// Result type for skyfuel-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in skyfuel-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Battery not found in database.
    #[error("Battery not found: {0}")]
    BatteryNotFound(i64),

    /// Battery with this serial number not found in database.
    #[error("No battery with serial number {0}")]
    SerialNotFound(String),

    /// Invalid field value in imported data.
    #[error("Invalid import record: {0}")]
    InvalidRecord(String),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
