//! Property-based tests for error messages and result ownership
//!
//! These tests verify that:
//! - Error messages keep the full library detail, whatever its length
//! - Wrapped and raw result fetches expose the same content
//! - Every stored buffer is released exactly once

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use greentea_mysql::core::db::{Cell, ConnectParams, Connection, ResultBuffer, StoredRows};
    use greentea_mysql::core::MysqlError;
    use greentea_mysql::results_grid::{ExportFormat, ResultsGrid};
    use greentea_mysql::test_utils::FakeLibrary;

    const SQL: &str = "SELECT * FROM t";

    /// Arbitrary bytes, binary included; no line feeds so rendered rows stay on one line
    fn arb_cell() -> impl Strategy<Value = Cell> {
        prop_oneof![Just(None), prop::collection::vec(0x0bu8..=0xff, 0..12).prop_map(Some)]
    }

    fn arb_rows() -> impl Strategy<Value = StoredRows> {
        (1usize..=5usize).prop_flat_map(|width| {
            (
                prop::collection::vec("[a-z][a-z0-9_]{0,8}", width),
                prop::collection::vec(prop::collection::vec(arb_cell(), width), 0..8),
            )
                .prop_map(|(columns, rows)| StoredRows::new(columns, rows))
        })
    }

    fn connected(library: FakeLibrary) -> Connection<FakeLibrary> {
        let params = ConnectParams::new("localhost", "root", "", "test");
        let mut conn = Connection::with_library(library, params).unwrap();
        conn.connect().unwrap();
        conn.query(SQL).unwrap();
        conn
    }

    proptest! {
        /// The message is the base text, ": ", then the detail, never truncated
        #[test]
        fn prop_connect_message_keeps_detail(detail in ".{0,2048}") {
            let library = FakeLibrary::new().refusing(&detail);
            let mut conn = Connection::with_library(library, ConnectParams::new("h", "u", "p", "d")).unwrap();

            let err = conn.connect().unwrap_err();
            prop_assert_eq!(err.to_string(), format!("Cannot connect on mysql_real_connect(): {}", detail));
            prop_assert_eq!(err.detail(), Some(detail.as_str()));
        }

        #[test]
        fn prop_store_result_variants_agree(rows in arb_rows()) {
            let library = FakeLibrary::new().with_result(SQL, rows.clone());
            let mut first = connected(library.clone());
            let mut second = connected(library);

            let wrapped = first.store_result().unwrap();
            let raw = second.store_result_raw().unwrap();
            prop_assert_eq!(wrapped.columns(), raw.columns());
            prop_assert_eq!(wrapped.rows(), raw.rows());
            prop_assert_eq!(wrapped.rows(), rows.rows.as_slice());
            prop_assert_eq!(wrapped.num_rows(), rows.rows.len());
            prop_assert_eq!(wrapped.num_fields(), rows.columns.len());
        }

        #[test]
        fn prop_buffers_released_once(rows in arb_rows(), fetches in 1usize..5) {
            let library = FakeLibrary::new().with_result(SQL, rows);
            let observer = library.clone();
            let mut conn = connected(library);

            for _ in 0..fetches {
                conn.query(SQL).unwrap();
                let rs = conn.store_result().unwrap();
                drop(rs);
            }
            drop(conn);

            let ledger = observer.ledger();
            prop_assert_eq!(ledger.released, fetches);
            prop_assert_eq!(ledger.opened, ledger.closed);
        }

        /// Rendering never panics and keeps one line per row plus the header
        #[test]
        fn prop_render_line_count(rows in arb_rows()) {
            let library = FakeLibrary::new().with_result(SQL, rows.clone());
            let mut conn = connected(library);
            let rs = conn.store_result().unwrap();

            let grid = ResultsGrid::from_result_set(&rs);
            let text = grid.export(ExportFormat::Text).unwrap();
            prop_assert_eq!(text.lines().count(), rows.rows.len() + 2);
            prop_assert!(grid.export(ExportFormat::Json).is_ok());
        }
    }

    #[test]
    fn test_binary_cells_survive_both_fetches() {
        let blob = vec![0xff, 0x00, 0xfe, 0x41];
        let rows = StoredRows::new(vec!["digest".to_string()], vec![vec![Some(blob.clone())]]);
        let library = FakeLibrary::new().with_result(SQL, rows);
        let mut first = connected(library.clone());
        let mut second = connected(library);

        let wrapped = first.store_result().unwrap();
        let raw = second.store_result_raw().unwrap();
        assert_eq!(wrapped.value(0, 0), Some(Some(blob.as_slice())));
        assert_eq!(raw.rows()[0][0].as_deref(), Some(blob.as_slice()));
        assert!(matches!(wrapped.text(0, 0), Some(Some(Err(_)))));
    }

    #[test]
    fn test_store_result_after_failed_query() {
        let library = FakeLibrary::new().with_result(SQL, StoredRows::default());
        let mut conn = connected(library);
        conn.store_result().unwrap();

        assert!(conn.query("SELEC broken").is_err());
        match conn.store_result() {
            Err(MysqlError::StoreResult { detail }) => assert!(detail.contains("SQL syntax")),
            other => panic!("Expected StoreResult error, got {:?}", other.map(|rs| rs.num_rows())),
        }
    }
}
