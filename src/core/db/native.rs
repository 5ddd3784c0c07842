/// Native Client Module
///
/// The production [`ClientLibrary`], backed by the `mysql` crate. Statements
/// run over the text protocol and their first result set is buffered in full
/// at query time, so `store_result` never touches the network.
use super::client::{Cell, ClientLibrary, ConnectParams, ConnectReply, ALREADY_CONNECTED};
use super::result::StoredRows;
use mysql::prelude::Queryable;
use mysql::{Column, Conn, OptsBuilder, Row, Value};
use tracing::debug;

const NOT_CONNECTED: &str = "MySQL server has gone away";

/// Client library backed by `mysql::Conn`
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlClient;

/// A session of [`MysqlClient`]
#[derive(Default)]
pub struct MysqlSession {
    conn: Option<Conn>,
    pending: Option<StoredRows>,
    last_error: String,
}

impl MysqlSession {
    /// Server-assigned connection id, once connected
    pub fn connection_id(&self) -> Option<u32> {
        self.conn.as_ref().map(Conn::connection_id)
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }
}

impl std::fmt::Debug for MysqlSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MysqlSession")
            .field("connection_id", &self.connection_id())
            .field("pending", &self.pending.is_some())
            .field("last_error", &self.last_error)
            .finish()
    }
}

fn opts(params: &ConnectParams) -> OptsBuilder {
    let dbname = Some(params.dbname.as_str()).filter(|name| !name.is_empty());
    OptsBuilder::new()
        .ip_or_hostname(Some(params.host.as_str()))
        .user(Some(params.user.as_str()))
        .pass(Some(params.password.as_str()))
        .db_name(dbname)
        .tcp_port(params.port)
}

/// Cell bytes as sent by the server. The text protocol only yields `Bytes`
/// and `NULL`; anything else is rendered as its SQL literal.
fn cell_bytes(value: Value) -> Cell {
    match value {
        Value::NULL => None,
        Value::Bytes(bytes) => Some(bytes),
        other => Some(other.as_sql(true).into_bytes()),
    }
}

fn column_names(columns: &[Column]) -> Vec<String> {
    columns
        .iter()
        .map(|column| column.name_str().into_owned())
        .collect()
}

/// Buffers one result set. No columns means the statement had no result set.
fn collect_rows<I>(columns: Vec<String>, rows: I) -> mysql::Result<Option<StoredRows>>
where
    I: IntoIterator<Item = mysql::Result<Vec<Value>>>,
{
    if columns.is_empty() {
        return Ok(None);
    }

    let mut stored = Vec::new();
    for row in rows {
        stored.push(row?.into_iter().map(cell_bytes).collect());
    }
    Ok(Some(StoredRows::new(columns, stored)))
}

/// Runs `sql` and buffers its first result set. Statements without columns
/// (INSERT, UPDATE, DDL) produce `None`.
fn buffer_query(conn: &mut Conn, sql: &str) -> mysql::Result<Option<StoredRows>> {
    let mut result = conn.query_iter(sql)?;
    let Some(set) = result.iter() else {
        return Ok(None);
    };

    let columns = column_names(set.columns().as_ref());
    collect_rows(columns, set.map(|row| row.map(Row::unwrap)))
}

impl ClientLibrary for MysqlClient {
    type Session = MysqlSession;
    type Buffer = StoredRows;

    fn init(&self) -> Option<MysqlSession> {
        Some(MysqlSession::default())
    }

    fn real_connect(
        &self,
        session: &mut MysqlSession,
        params: &ConnectParams,
    ) -> ConnectReply<MysqlSession> {
        if session.is_open() {
            session.last_error = ALREADY_CONNECTED.to_string();
            return ConnectReply::Failed;
        }

        match Conn::new(opts(params)) {
            Ok(conn) => {
                debug!(connection_id = conn.connection_id(), "mysql connection established");
                session.conn = Some(conn);
                session.last_error.clear();
                ConnectReply::Connected
            }
            Err(e) => {
                session.last_error = e.to_string();
                ConnectReply::Failed
            }
        }
    }

    fn real_query(&self, session: &mut MysqlSession, sql: &str) -> bool {
        session.pending = None;
        let Some(conn) = session.conn.as_mut() else {
            session.last_error = NOT_CONNECTED.to_string();
            return false;
        };

        match buffer_query(conn, sql) {
            Ok(stored) => {
                session.pending = stored;
                session.last_error.clear();
                true
            }
            Err(e) => {
                session.last_error = e.to_string();
                false
            }
        }
    }

    fn store_result(&self, session: &mut MysqlSession) -> Option<StoredRows> {
        session.pending.take()
    }

    fn error(&self, session: &MysqlSession) -> String {
        session.last_error.clone()
    }

    fn close(&self, session: &mut MysqlSession) {
        session.pending = None;
        if session.conn.take().is_some() {
            debug!("mysql connection closed");
        }
    }
}
