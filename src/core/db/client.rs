/// Client Library Boundary
///
/// The wrapper never talks to a server itself. Every substantive operation is
/// delegated to a [`ClientLibrary`], whose methods mirror the native client
/// calls one to one.
use serde::Deserialize;
use std::fmt;

/// Default MySQL TCP port
pub const DEFAULT_PORT: u16 = 3306;

/// Error text of a connect attempt on a session that is already connected
pub const ALREADY_CONNECTED: &str =
    "This handle is already connected. Use a separate handle for each connection.";

/// Parameters used to open a session.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectParams {
    pub host: String,
    pub user: String,
    #[serde(default)]
    pub password: String,
    /// Default database; empty means none
    #[serde(default)]
    pub dbname: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl ConnectParams {
    /// Creates parameters for the default port
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        dbname: impl Into<String>,
    ) -> Self {
        ConnectParams {
            host: host.into(),
            user: user.into(),
            password: password.into(),
            dbname: dbname.into(),
            port: DEFAULT_PORT,
        }
    }

    /// Replaces the TCP port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

// The password stays out of logs and panic messages.
impl fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectParams")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"***")
            .field("dbname", &self.dbname)
            .field("port", &self.port)
            .finish()
    }
}

/// Outcome of [`ClientLibrary::real_connect`].
#[derive(Debug)]
pub enum ConnectReply<S> {
    /// The session passed in is now connected
    Connected,
    /// The attempt failed; details are available through [`ClientLibrary::error`]
    Failed,
    /// The library handed back a session other than the one passed in
    Foreign(S),
}

/// One cell as sent by the server: raw bytes, `None` for SQL NULL
pub type Cell = Option<Vec<u8>>;

/// Read access to a buffered result.
pub trait ResultBuffer {
    /// Column names, in select-list order
    fn columns(&self) -> &[String];

    /// Buffered rows
    fn rows(&self) -> &[Vec<Cell>];
}

/// The native client call boundary.
///
/// Sessions are opaque handles owned by the caller. Buffers are released by
/// dropping them.
pub trait ClientLibrary {
    type Session;
    type Buffer: ResultBuffer;

    /// Allocates an unconnected session, `None` on failure
    fn init(&self) -> Option<Self::Session>;

    /// Connects `session` using `params`
    ///
    /// A session that is already connected is refused with [`ALREADY_CONNECTED`].
    fn real_connect(
        &self,
        session: &mut Self::Session,
        params: &ConnectParams,
    ) -> ConnectReply<Self::Session>;

    /// Executes one statement, returning false on failure
    fn real_query(&self, session: &mut Self::Session, sql: &str) -> bool;

    /// Takes the buffered result of the last statement, if there is one
    fn store_result(&self, session: &mut Self::Session) -> Option<Self::Buffer>;

    /// Last error text recorded on `session`; empty when there is none
    fn error(&self, session: &Self::Session) -> String;

    /// Closes `session` and frees whatever the library holds for it
    fn close(&self, session: &mut Self::Session);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_default_port() {
        let params = ConnectParams::new("localhost", "root", "secret", "test");
        assert_eq!(params.port, DEFAULT_PORT);
        assert_eq!(params.with_port(3307).port, 3307);
    }

    #[test]
    fn test_params_debug_hides_password() {
        let params = ConnectParams::new("localhost", "root", "hunter2", "test");
        let rendered = format!("{:?}", params);
        assert!(rendered.contains("localhost"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_params_deserialize_defaults() {
        let params: ConnectParams = toml::from_str(
            r#"
host = "db.internal"
user = "app"
"#,
        )
        .expect("Failed to parse params");
        assert_eq!(params.host, "db.internal");
        assert_eq!(params.password, "");
        assert_eq!(params.dbname, "");
        assert_eq!(params.port, DEFAULT_PORT);
    }
}
