//! Error handling module for bootconsole
//!
//! Provides centralized error handling with proper error types using thiserror.
//! All errors in the library should use these types for consistency.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for bootconsole operations
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file could not be located in any search directory
    #[error("could not find configuration file: {0}")]
    NotFound(String),

    /// A managed file is missing its ownership marker; write refused
    #[error("refusing to write to {path}: managed-file marker not found: {marker}")]
    WriteRefused { path: PathBuf, marker: String },

    /// A partition carries a filesystem signature we do not know how to resize
    #[error("filesystem on {device} is not compatible: {signature}")]
    IncompatibleFilesystem { device: String, signature: String },

    /// External tool output did not contain the expected token
    #[error("could not parse output of {tool}: {detail}")]
    UnparsableToolOutput { tool: String, detail: String },

    /// Non-zero subprocess exit, surfaced verbatim with zero retries
    #[error("{command} failed (exit code {code}): {stderr}")]
    ExternalTool {
        command: String,
        code: i32,
        stderr: String,
    },

    /// Neither the hostname nor any alias matches the appliance convention
    #[error("no hostname or alias matches the appliance naming convention: {0}")]
    NamingConvention(String),

    /// Validation errors (user input, config values)
    #[error("validation error: {0}")]
    Validation(String),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for bootconsole operations
pub type Result<T> = std::result::Result<T, ConsoleError>;

impl ConsoleError {
    /// Create a not-found error for a configuration file name
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an unparsable-output error
    pub fn unparsable(tool: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UnparsableToolOutput {
            tool: tool.into(),
            detail: detail.into(),
        }
    }
}
