/// Greentea MySQL Error Module
///
/// This module defines the error type shared by the whole crate. Every
/// fallible operation returns a [`Result`], so callers decide at the call
/// site whether a failure is fatal (`?`, `expect`) or recoverable (`match`,
/// `is_ok`).
use thiserror::Error;

/// Error type for the MySQL wrapper.
///
/// Messages that carry a `detail` render as `"<base>: <detail>"`, where the
/// detail is the client library's own last-error text for the session. The
/// detail is kept verbatim, even when the library reported an empty string.
#[derive(Error, Debug)]
pub enum MysqlError {
    /// The client library could not allocate a session handle
    #[error("Cannot init mysql on mysql_init()")]
    Init,

    /// The connection attempt was refused or failed
    #[error("Cannot connect on mysql_real_connect(): {detail}")]
    Connect { detail: String },

    /// The library connected a session other than the one we own
    #[error("Bug on MySQL::connect()")]
    ForeignSession,

    /// The statement could not be executed
    #[error("Error on mysql_real_query(): {detail}")]
    Query { detail: String },

    /// No buffered result is available for the last statement
    #[error("Error on mysql_store_result(): {detail}")]
    StoreResult { detail: String },

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parsing errors
    #[error("Configuration error: {0}")]
    Toml(#[from] toml::de::Error),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Result export errors (unknown format, serialization)
    #[error("Export error: {0}")]
    Export(String),
}

impl MysqlError {
    /// Returns true when the failure is a broken assumption of this wrapper
    /// rather than an operational failure reported by the library.
    pub fn is_internal(&self) -> bool {
        matches!(self, MysqlError::ForeignSession)
    }

    /// The client library's error text, if this failure carries one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            MysqlError::Connect { detail }
            | MysqlError::Query { detail }
            | MysqlError::StoreResult { detail } => Some(detail),
            _ => None,
        }
    }
}

/// Type alias for Result to use MysqlError as the error type.
pub type Result<T> = std::result::Result<T, MysqlError>;
