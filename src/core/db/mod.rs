/// Database Module
///
/// ## Architecture
///
/// The database layer is split into four concerns:
/// - **Client boundary** (`client.rs`): the `ClientLibrary` trait, one method per native call
/// - **Connection** (`connection.rs`): owns a session and turns library failures into `MysqlError`
/// - **Result sets** (`result.rs`): owning wrappers around buffered query results
/// - **Native client** (`native.rs`): the production library, backed by the `mysql` crate
///
/// ## Error Handling
///
/// All operations use the standardized `MysqlError` type for consistent error propagation.
pub mod client;
pub mod connection;
pub mod native;
pub mod result;

pub use client::*;
pub use connection::*;
pub use native::*;
pub use result::*;
