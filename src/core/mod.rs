/// Core Module for Greentea MySQL
///
/// This module contains the session wrapper and the error type. Everything
/// else in the crate (configuration, rendering, the binary) is built on it.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{MysqlError, Result};
