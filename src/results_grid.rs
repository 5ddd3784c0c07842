//! Results Grid Module
//!
//! Renders a stored result set as an aligned text table, CSV or JSON.

use crate::core::db::{ResultBuffer, ResultSet};
use crate::core::{MysqlError, Result};
use std::str::FromStr;

/// Text shown for SQL NULL in text and CSV output
pub const NULL_TEXT: &str = "NULL";

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = MysqlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "table" => Ok(ExportFormat::Text),
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(MysqlError::Export(format!(
                "Unsupported export format: '{}'. Supported formats: text, csv, json",
                s
            ))),
        }
    }
}

/// A detached copy of a result set, ready for rendering.
#[derive(Debug, Clone, Default)]
pub struct ResultsGrid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl ResultsGrid {
    /// Creates a new, empty ResultsGrid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies headers and rows out of a result set
    pub fn from_result_set<B: ResultBuffer>(rs: &ResultSet<B>) -> Self {
        let rows = rs
            .rows()
            .iter()
            .map(|row| row.iter().map(|cell| cell.as_deref().map(display_text)).collect())
            .collect();
        ResultsGrid {
            headers: rs.columns().to_vec(),
            rows,
        }
    }

    /// Renders the grid in `format`
    pub fn export(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Text => Ok(self.render()),
            ExportFormat::Csv => Ok(self.export_to_csv()),
            ExportFormat::Json => self.export_to_json(),
        }
    }

    /// Renders an aligned table with a header underline.
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.as_deref().unwrap_or(NULL_TEXT).chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }

        let mut output = String::new();
        if !self.headers.is_empty() {
            push_line(&mut output, self.headers.iter().map(String::as_str), &widths);
            let underline: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            output.push_str(&underline.join("-+-"));
            output.push('\n');
        }
        for row in &self.rows {
            push_line(
                &mut output,
                row.iter().map(|c| c.as_deref().unwrap_or(NULL_TEXT)),
                &widths,
            );
        }
        output
    }

    fn export_to_csv(&self) -> String {
        let mut output = String::new();
        if !self.headers.is_empty() {
            let header: Vec<String> = self.headers.iter().map(|h| csv_field(h)).collect();
            output.push_str(&header.join(","));
            output.push('\n');
        }
        for row in &self.rows {
            // NULL is an empty unquoted field, empty strings are quoted
            let fields: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    Some(value) if value.is_empty() => "\"\"".to_string(),
                    Some(value) => csv_field(value),
                    None => String::new(),
                })
                .collect();
            output.push_str(&fields.join(","));
            output.push('\n');
        }
        output
    }

    fn export_to_json(&self) -> Result<String> {
        let records: Vec<serde_json::Value> = self
            .rows
            .iter()
            .map(|row| {
                let object: serde_json::Map<String, serde_json::Value> = self
                    .headers
                    .iter()
                    .zip(row)
                    .map(|(name, cell)| {
                        let value = match cell {
                            Some(text) => serde_json::Value::String(text.clone()),
                            None => serde_json::Value::Null,
                        };
                        (name.clone(), value)
                    })
                    .collect();
                serde_json::Value::Object(object)
            })
            .collect();
        serde_json::to_string_pretty(&records).map_err(|e| MysqlError::Export(e.to_string()))
    }
}

fn push_line<'a>(output: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    output.push_str(padded.join(" | ").trim_end());
    output.push('\n');
}

/// UTF-8 cells as text, anything else as `0x`-prefixed hex
fn display_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let hex: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
            format!("0x{}", hex)
        }
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> ResultsGrid {
        ResultsGrid {
            headers: vec!["id".to_string(), "name".to_string()],
            rows: vec![
                vec![Some("1".to_string()), Some("Alice".to_string())],
                vec![Some("2".to_string()), None],
            ],
        }
    }

    #[test]
    fn test_render_aligns_columns() {
        let expected = "\
id | name
---+------
1  | Alice
2  | NULL
";
        assert_eq!(grid().render(), expected);
    }

    #[test]
    fn test_export_csv() {
        let mut grid = grid();
        grid.rows.push(vec![Some("3".to_string()), Some("O\"Neil, Jr".to_string())]);
        grid.rows.push(vec![Some("4".to_string()), Some(String::new())]);

        let csv = grid.export(ExportFormat::Csv).unwrap();
        assert_eq!(csv, "id,name\n1,Alice\n2,\n3,\"O\"\"Neil, Jr\"\n4,\"\"\n");
    }

    #[test]
    fn test_export_json() {
        let json = grid().export(ExportFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["name"], "Alice");
        assert!(parsed[1]["name"].is_null());
        assert_eq!(parsed.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("table".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        let err = "xml".parse::<ExportFormat>().unwrap_err();
        assert!(err.to_string().contains("Unsupported export format"));
    }

    #[test]
    fn test_binary_cells_render_as_hex() {
        use crate::core::db::StoredRows;

        let rs = ResultSet::new(StoredRows::new(
            vec!["digest".to_string()],
            vec![vec![Some(vec![0xff, 0x00, 0xfe, 0x41])], vec![Some(b"ok".to_vec())]],
        ));
        let grid = ResultsGrid::from_result_set(&rs);
        assert_eq!(grid.rows[0][0].as_deref(), Some("0xFF00FE41"));
        assert_eq!(grid.rows[1][0].as_deref(), Some("ok"));
    }

    #[test]
    fn test_empty_grid() {
        assert_eq!(ResultsGrid::new().render(), "");
        assert_eq!(ResultsGrid::new().export(ExportFormat::Json).unwrap(), "[]");
    }
}
