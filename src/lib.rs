// Core infrastructure modules
pub mod core;

// Feature-specific modules
pub mod config;
pub mod results_grid;

// Scripted client library, compiled only for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
