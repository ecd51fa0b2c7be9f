//! Error types for framestamp-core

use thiserror::Error;

/// Result type alias for framestamp-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for framestamp-core
#[derive(Debug, Error)]
pub enum Error {
    /// Manifest parsing or validation error
    #[error("Invalid manifest: {0}")]
    Manifest(String),

    /// Pipeline graph construction or element resolution error
    #[error("Pipeline construction failed: {0}")]
    Construction(String),

    /// Metadata attachment error (payload allocation or initialization)
    #[error("Metadata attachment failed: {0}")]
    Attachment(String),

    /// Runtime error signaled by an element during streaming
    #[error("Error received from element {element}: {message}")]
    Runtime {
        /// Name of the element that signaled the error
        element: String,
        /// Primary error message
        message: String,
        /// Optional diagnostic detail
        debug: Option<String>,
    },

    /// General execution error
    #[error("Execution error: {0}")]
    Execution(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
