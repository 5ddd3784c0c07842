/// Connection Management Module
///
/// A `Connection` owns one client-library session for its whole lifetime and
/// turns every library failure into a `MysqlError`.

use super::client::{ClientLibrary, ConnectParams, ConnectReply};
use super::native::MysqlClient;
use super::result::ResultSet;
use crate::core::{MysqlError, Result};
use std::fmt;
use tracing::{debug, warn};

/// Lifecycle of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// A session handle exists but is not connected
    SessionInitialized,
    /// `connect()` succeeded
    Connected,
}

/// An owned database session.
///
/// Failures never move the connection into a separate state: a failed call
/// leaves it exactly as it was.
pub struct Connection<L: ClientLibrary = MysqlClient> {
    library: L,
    params: ConnectParams,
    session: L::Session,
    state: ConnectionState,
}

impl Connection<MysqlClient> {
    /// Creates a connection backed by the `mysql` crate on the default port
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use greentea_mysql::core::db::Connection;
    ///
    /// let mut conn = Connection::new("127.0.0.1", "root", "", "test")?;
    /// conn.connect()?;
    /// conn.query("SELECT 1")?;
    /// let rs = conn.store_result()?;
    /// assert_eq!(rs.num_rows(), 1);
    /// # Ok::<(), greentea_mysql::core::MysqlError>(())
    /// ```
    pub fn new(host: &str, user: &str, password: &str, dbname: &str) -> Result<Self> {
        Connection::with_library(MysqlClient, ConnectParams::new(host, user, password, dbname))
    }
}

impl<L: ClientLibrary> Connection<L> {
    /// Creates a connection on top of an arbitrary client library
    ///
    /// # Returns
    ///
    /// `MysqlError::Init` when the library cannot allocate a session.
    pub fn with_library(library: L, params: ConnectParams) -> Result<Self> {
        let session = match library.init() {
            Some(session) => session,
            None => {
                warn!("client library returned no session");
                return Err(MysqlError::Init);
            }
        };
        debug!(host = %params.host, port = params.port, "session initialized");

        Ok(Connection {
            library,
            params,
            session,
            state: ConnectionState::SessionInitialized,
        })
    }

    /// Connects the owned session to the server
    ///
    /// # Returns
    ///
    /// `Ok(())` only when the library connected the session this connection
    /// owns. A session other than ours is closed before
    /// `MysqlError::ForeignSession` is returned.
    pub fn connect(&mut self) -> Result<()> {
        debug!(
            host = %self.params.host,
            user = %self.params.user,
            dbname = %self.params.dbname,
            port = self.params.port,
            "connecting"
        );

        match self.library.real_connect(&mut self.session, &self.params) {
            ConnectReply::Connected => {
                self.state = ConnectionState::Connected;
                debug!(host = %self.params.host, "connected");
                Ok(())
            }
            ConnectReply::Failed => {
                let detail = self.library.error(&self.session);
                warn!(host = %self.params.host, error = %detail, "connect failed");
                Err(MysqlError::Connect { detail })
            }
            ConnectReply::Foreign(mut other) => {
                self.library.close(&mut other);
                warn!(host = %self.params.host, "library connected a foreign session");
                Err(MysqlError::ForeignSession)
            }
        }
    }

    /// Executes a single statement
    ///
    /// A result set produced by the statement is kept by the library until
    /// [`store_result`](Self::store_result) takes it.
    pub fn query(&mut self, sql: &str) -> Result<()> {
        // Statements may carry credentials, only their size is logged
        debug!(sql_len = sql.len(), "query");
        if self.library.real_query(&mut self.session, sql) {
            return Ok(());
        }

        // Server errors quote the statement, so the detail stays out of the log too
        warn!(sql_len = sql.len(), "query failed");
        Err(MysqlError::Query {
            detail: self.library.error(&self.session),
        })
    }

    /// Takes the buffered result of the last statement
    ///
    /// # Returns
    ///
    /// `MysqlError::StoreResult` when the library has no result. This covers
    /// both a statement that produces no result set (empty detail) and a
    /// genuine failure; the two are not told apart here.
    pub fn store_result(&mut self) -> Result<ResultSet<L::Buffer>> {
        self.fetch_buffer().map(ResultSet::new)
    }

    /// Same fetch as [`store_result`](Self::store_result), without the wrapper
    ///
    /// The caller owns the library buffer and releases it by dropping it.
    pub fn store_result_raw(&mut self) -> Result<L::Buffer> {
        self.fetch_buffer()
    }

    fn fetch_buffer(&mut self) -> Result<L::Buffer> {
        match self.library.store_result(&mut self.session) {
            Some(buffer) => Ok(buffer),
            None => {
                let detail = self.library.error(&self.session);
                debug!(has_detail = !detail.is_empty(), "no result to store");
                Err(MysqlError::StoreResult { detail })
            }
        }
    }

    pub fn params(&self) -> &ConnectParams {
        &self.params
    }

    pub fn port(&self) -> u16 {
        self.params.port
    }

    /// Changes the port used by the next `connect()`
    pub fn with_port(mut self, port: u16) -> Self {
        self.params.port = port;
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// The owned session handle
    pub fn session(&self) -> &L::Session {
        &self.session
    }

    pub fn library(&self) -> &L {
        &self.library
    }
}

impl<L: ClientLibrary> Drop for Connection<L> {
    fn drop(&mut self) {
        debug!(host = %self.params.host, "closing session");
        self.library.close(&mut self.session);
    }
}

impl<L: ClientLibrary> fmt::Debug for Connection<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("params", &self.params)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
