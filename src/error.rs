//! Error types for rota
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, malformed dates, invalid config)
//! - 4: Operation failed (storage error, lock contention)
//!
//! A backward-edit row that matches nothing in the store is *not* an error:
//! the edit is logged and dropped (see `today::apply_row_edit`).

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the rota CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for rota operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Not a rota directory: {0} (run `rota init`)")]
    NotInitialized(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Template already exists: {0}")]
    DuplicateTemplate(String),

    #[error(
        "Invalid interval for template {template_id}: {interval} (must be a positive number of days)"
    )]
    InvalidInterval { template_id: String, interval: i64 },

    #[error("Malformed date {text:?} (expected {expected})")]
    MalformedDate { text: String, expected: &'static str },

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::NotInitialized(_)
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::TemplateNotFound(_)
            | Error::DuplicateTemplate(_)
            | Error::InvalidInterval { .. }
            | Error::MalformedDate { .. } => exit_codes::USER_ERROR,

            // Operation failures
            Error::Io(_)
            | Error::Json(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output, where the variant carries any
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::InvalidInterval {
                template_id,
                interval,
            } => Some(serde_json::json!({
                "template_id": template_id,
                "interval": interval,
            })),
            Error::MalformedDate { text, expected } => Some(serde_json::json!({
                "text": text,
                "expected": expected,
            })),
            _ => None,
        }
    }
}

/// Result type alias for rota operations
pub type Result<T> = std::result::Result<T, Error>;
