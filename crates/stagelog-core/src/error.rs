//! Error types for log decoding and batch processing

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while decoding a trial or processing a batch
#[derive(Error, Debug)]
pub enum StageLogError {
    #[error("Log file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing header for '{interface}': expected {expected} line(s), found {found}")]
    MissingHeader {
        interface: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Invalid header value for '{field}' at line {line}: {value:?}")]
    InvalidHeader {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("Row width mismatch at line {line}: expected {expected} tokens, found {found}")]
    RowWidth {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid number at line {line}, column {column}: {value:?}")]
    InvalidNumber {
        line: usize,
        column: usize,
        value: String,
    },

    #[error("Pose time goes backwards at line {line}: {previous} then {next}")]
    TimeOrder { line: usize, previous: f64, next: f64 },

    #[error("Pose/scan misalignment: {poses} pose samples vs {scans} laser scans")]
    Misaligned { poses: usize, scans: usize },

    #[error("Invalid log directory layout: {0}")]
    InvalidLayout(String),

    #[error("Trial worker failed: {0}")]
    Worker(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to write {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StageLogError {
    /// Map an I/O error on `path`, turning `NotFound` into its own variant
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            StageLogError::NotFound(path)
        } else {
            StageLogError::Io { path, source }
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, StageLogError>;
