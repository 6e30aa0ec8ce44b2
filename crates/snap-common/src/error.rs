//! Error types for forecast-snapshot crates.

use thiserror::Error;

/// Result type alias using SnapError.
pub type SnapResult<T> = Result<T, SnapError>;

/// Primary error type for snapshot operations.
#[derive(Debug, Error)]
pub enum SnapError {
    // === Discovery Errors ===
    #[error("No data found for provider '{provider}' within the lookback window")]
    PrefixNotFound { provider: String },

    #[error("No file matching markers {markers:?} with extension '{extension}' under '{prefix}'")]
    NoMatchingFile {
        prefix: String,
        markers: Vec<String>,
        extension: String,
    },

    // === Storage Errors ===
    #[error("Storage error: {0}")]
    StorageError(String),

    // === GRIB2 Errors ===
    #[error("Invalid GRIB2 data: {0}")]
    InvalidGrib2(String),

    #[error("Invalid GRIB2 section {section}: {reason}")]
    InvalidSection { section: u8, reason: String },

    #[error("Unsupported grid definition template {template}")]
    UnsupportedGrid { template: u16 },

    #[error("Unsupported data representation template {template}")]
    UnsupportedPacking { template: u16 },

    #[error("Failed to unpack GRIB2 data: {0}")]
    UnpackingError(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    RenderError(String),

    // === Infrastructure Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
