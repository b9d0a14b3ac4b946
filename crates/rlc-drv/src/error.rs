//! Driver error types.
//!
//! These cover the driver's own failures: loading the project file,
//! walking source directories, writing dump files. Faults in the source
//! being compiled are never errors; they are collected on the
//! [`Reporter`](rlc_util::Reporter) and surface as
//! [`DriverError::CompilationFailed`].

use thiserror::Error;

/// Everything that can go wrong while driving a compilation.
#[derive(Error, Debug)]
pub enum DriverError {
    /// The project file is missing or malformed.
    #[error("Project error: {0}")]
    Project(String),

    /// A file or directory operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing a parse-tree dump failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The source being compiled raised faults; they are on the
    /// session's reporter.
    #[error("compilation failed")]
    CompilationFailed,
}

/// Result type alias for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;
