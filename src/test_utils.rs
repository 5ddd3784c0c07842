/// # Test Utilities Module
///
/// Scripted client library for exercising `Connection` without a server.
///
/// This module provides:
/// - `FakeLibrary`, a `ClientLibrary` whose connect/query behaviour is set up front
/// - A shared `Ledger` counting opened and closed sessions and released buffers
/// - Sample row fixtures

use crate::core::db::{Cell, ClientLibrary, ConnectParams, ConnectReply, ResultBuffer, StoredRows, ALREADY_CONNECTED};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

const SYNTAX_ERROR: &str = "You have an error in your SQL syntax";
const NOT_CONNECTED: &str = "MySQL server has gone away";

/// Resource accounting shared by a `FakeLibrary` and all its clones
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    pub opened: usize,
    pub closed: usize,
    pub released: usize,
    /// Library calls in order, e.g. `"connect 1"`, `"close 2"`, `"release"`
    pub events: Vec<String>,
}

/// How `real_connect` answers
#[derive(Debug, Clone)]
pub enum ConnectScript {
    Accept,
    Refuse(String),
    /// Connect a brand new session instead of the one passed in
    Foreign,
}

/// Session handle of `FakeLibrary`
#[derive(Debug)]
pub struct FakeSession {
    id: u64,
    connected: bool,
    closed: bool,
    pending: Option<StoredRows>,
    last_error: String,
}

impl FakeSession {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Buffer handed out by `FakeLibrary::store_result`; counts its release.
#[derive(Debug)]
pub struct TrackedRows {
    rows: StoredRows,
    ledger: Arc<Mutex<Ledger>>,
}

impl ResultBuffer for TrackedRows {
    fn columns(&self) -> &[String] {
        &self.rows.columns
    }

    fn rows(&self) -> &[Vec<Cell>] {
        &self.rows.rows
    }
}

impl Drop for TrackedRows {
    fn drop(&mut self) {
        let mut ledger = lock(&self.ledger);
        ledger.released += 1;
        ledger.events.push("release".to_string());
    }
}

fn lock(ledger: &Arc<Mutex<Ledger>>) -> MutexGuard<'_, Ledger> {
    // A panicking test must not hide the ledger from the others
    ledger.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Scripted client library. Clones share one ledger.
#[derive(Debug, Clone)]
pub struct FakeLibrary {
    ledger: Arc<Mutex<Ledger>>,
    fail_init: bool,
    connect: ConnectScript,
    results: HashMap<String, StoredRows>,
    statements: HashSet<String>,
}

impl Default for FakeLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeLibrary {
    /// A library that accepts every connection and knows no statements
    pub fn new() -> Self {
        FakeLibrary {
            ledger: Arc::new(Mutex::new(Ledger::default())),
            fail_init: false,
            connect: ConnectScript::Accept,
            results: HashMap::new(),
            statements: HashSet::new(),
        }
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn refusing(mut self, message: &str) -> Self {
        self.connect = ConnectScript::Refuse(message.to_string());
        self
    }

    pub fn foreign(mut self) -> Self {
        self.connect = ConnectScript::Foreign;
        self
    }

    /// Registers a statement that returns `rows`
    pub fn with_result(mut self, sql: &str, rows: StoredRows) -> Self {
        self.results.insert(sql.to_string(), rows);
        self
    }

    /// Registers a statement that succeeds without a result set
    pub fn with_statement(mut self, sql: &str) -> Self {
        self.statements.insert(sql.to_string());
        self
    }

    /// Snapshot of the shared ledger
    pub fn ledger(&self) -> Ledger {
        lock(&self.ledger).clone()
    }

    fn open_session(&self) -> FakeSession {
        let mut ledger = lock(&self.ledger);
        ledger.opened += 1;
        let id = ledger.opened as u64;
        ledger.events.push(format!("init {}", id));
        FakeSession {
            id,
            connected: false,
            closed: false,
            pending: None,
            last_error: String::new(),
        }
    }
}

impl ClientLibrary for FakeLibrary {
    type Session = FakeSession;
    type Buffer = TrackedRows;

    fn init(&self) -> Option<FakeSession> {
        if self.fail_init {
            return None;
        }
        Some(self.open_session())
    }

    fn real_connect(&self, session: &mut FakeSession, _params: &ConnectParams) -> ConnectReply<FakeSession> {
        match &self.connect {
            _ if session.connected => {
                session.last_error = ALREADY_CONNECTED.to_string();
                ConnectReply::Failed
            }
            ConnectScript::Accept => {
                session.connected = true;
                session.last_error.clear();
                lock(&self.ledger).events.push(format!("connect {}", session.id));
                ConnectReply::Connected
            }
            ConnectScript::Refuse(message) => {
                session.last_error = message.clone();
                ConnectReply::Failed
            }
            ConnectScript::Foreign => {
                let mut other = self.open_session();
                other.connected = true;
                ConnectReply::Foreign(other)
            }
        }
    }

    fn real_query(&self, session: &mut FakeSession, sql: &str) -> bool {
        session.pending = None;
        if !session.connected {
            session.last_error = NOT_CONNECTED.to_string();
            return false;
        }

        if let Some(rows) = self.results.get(sql) {
            session.pending = Some(rows.clone());
        } else if !self.statements.contains(sql) {
            session.last_error = format!("{} near '{}'", SYNTAX_ERROR, sql);
            return false;
        }
        session.last_error.clear();
        true
    }

    fn store_result(&self, session: &mut FakeSession) -> Option<TrackedRows> {
        let rows = session.pending.take()?;
        Some(TrackedRows {
            rows,
            ledger: Arc::clone(&self.ledger),
        })
    }

    fn error(&self, session: &FakeSession) -> String {
        session.last_error.clone()
    }

    fn close(&self, session: &mut FakeSession) {
        if session.closed {
            return;
        }
        session.closed = true;
        session.connected = false;
        session.pending = None;
        let mut ledger = lock(&self.ledger);
        ledger.closed += 1;
        ledger.events.push(format!("close {}", session.id));
    }
}

/// Two-column `id`/`name` fixture
pub fn sample_rows() -> StoredRows {
    StoredRows::new(
        vec!["id".to_string(), "name".to_string()],
        vec![
            vec![Some(b"1".to_vec()), Some(b"Alice".to_vec())],
            vec![Some(b"2".to_vec()), Some(b"Bob".to_vec())],
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_ledger() {
        let library = FakeLibrary::new();
        let clone = library.clone();
        let _session = library.init().unwrap();
        assert_eq!(clone.ledger().opened, 1);
    }

    #[test]
    fn test_close_is_idempotent() {
        let library = FakeLibrary::new();
        let mut session = library.init().unwrap();
        library.close(&mut session);
        library.close(&mut session);
        assert_eq!(library.ledger().closed, 1);
    }

    #[test]
    fn test_foreign_session_gets_new_id() {
        let library = FakeLibrary::new().foreign();
        let mut session = library.init().unwrap();
        let params = ConnectParams::new("h", "u", "p", "d");
        match library.real_connect(&mut session, &params) {
            ConnectReply::Foreign(other) => assert_ne!(other.id(), session.id()),
            other => panic!("Expected foreign session, got {:?}", other),
        }
    }
}
