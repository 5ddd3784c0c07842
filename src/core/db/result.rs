/// Result Set Module
///
/// Owning wrappers around buffered query results.
use super::client::{Cell, ResultBuffer};
use std::str::Utf8Error;

/// Fully buffered rows of a text-protocol result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredRows {
    /// Column names from the query result
    pub columns: Vec<String>,
    /// Cell bytes exactly as the server sent them; `None` is SQL NULL
    pub rows: Vec<Vec<Cell>>,
}

impl StoredRows {
    /// Creates a new StoredRows from column names and row data
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        StoredRows { columns, rows }
    }
}

impl ResultBuffer for StoredRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }
}

/// A result buffer owned by exactly one `ResultSet`.
///
/// Not `Clone`. Dropping the set releases the underlying buffer.
#[derive(Debug)]
pub struct ResultSet<B: ResultBuffer> {
    buffer: B,
}

impl<B: ResultBuffer> ResultSet<B> {
    /// Takes ownership of a buffer returned by the client library
    pub fn new(buffer: B) -> Self {
        ResultSet { buffer }
    }

    /// Column names
    pub fn columns(&self) -> &[String] {
        self.buffer.columns()
    }

    pub fn num_fields(&self) -> usize {
        self.buffer.columns().len()
    }

    pub fn num_rows(&self) -> usize {
        self.buffer.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        self.buffer.rows()
    }

    pub fn row(&self, index: usize) -> Option<&[Cell]> {
        self.buffer.rows().get(index).map(Vec::as_slice)
    }

    /// Returns the raw bytes of the cell at (`row`, `column`).
    ///
    /// `None` when out of range, `Some(None)` for SQL NULL.
    pub fn value(&self, row: usize, column: usize) -> Option<Option<&[u8]>> {
        self.row(row)?.get(column).map(Option::as_deref)
    }

    /// Same as [`value`](Self::value), decoded as UTF-8.
    ///
    /// Binary columns that are not valid UTF-8 yield `Err`; nothing is replaced.
    pub fn text(&self, row: usize, column: usize) -> Option<Option<Result<&str, Utf8Error>>> {
        self.value(row, column)
            .map(|cell| cell.map(std::str::from_utf8))
    }

    /// Looks a column up by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns().iter().position(|c| c == name)
    }

    /// Borrows the underlying buffer
    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// Gives up the wrapper and returns the buffer to the caller
    pub fn into_buffer(self) -> B {
        self.buffer
    }
}
