//! Integration tests for direct queries on a connection.

mod common;

use common::{column, MockEngine, ResultSet, SharedStats};
use mysql_rowbind::{
    ConnectParams, Connection, Cursor, CursorState, DatabaseEngine, Error, FetchMode, ServerType,
    Value,
};

fn users() -> ResultSet {
    ResultSet::rows(
        vec![column("id", ServerType::Long), column("name", ServerType::VarString)],
        &[&[Some("1"), Some("alice")], &[Some("2"), None]],
    )
}

fn connect(engine: MockEngine) -> Connection<MockEngine> {
    Connection::from_engine(engine)
}

#[test]
fn test_connect_failure_is_connection_error() {
    let params = ConnectParams::new("localhost", "app", "wrong");
    let result = Connection::<MockEngine>::connect(&params);
    match result {
        Err(Error::Connection { code, message }) => {
            assert_eq!(code, 1045);
            assert!(message.contains("app"));
        }
        other => panic!("expected connection error, got {:?}", other.err()),
    }
}

#[test]
fn test_connect_and_id() {
    let params = ConnectParams::new("localhost", "app", "secret");
    let conn = Connection::<MockEngine>::connect(&params).unwrap();
    assert_eq!(conn.id(), 42);
    assert!(!conn.is_closed());
    assert!(conn.autocommit());
}

#[test]
fn test_query_table() {
    let stats = SharedStats::default();
    let mut conn = connect(
        MockEngine::new(stats.clone()).with_query("SELECT * FROM users", vec![users()]),
    );

    let result = conn.query_table("SELECT * FROM users").unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result.column_names(), vec!["id", "name"]);
    assert_eq!(result.affected_rows, 2);
    assert_eq!(result.rows[0].get(0), Some(&Value::Int(1)));
    assert_eq!(result.rows[0].get_by_name("NAME").and_then(Value::as_str), Some("alice"));
    assert_eq!(result.rows[1].get(1), Some(&Value::Null));

    let stats = stats.get();
    assert_eq!(stats.open_modes, vec![FetchMode::Buffered]);
    assert_eq!(stats.free_results, 1);
}

#[test]
fn test_query_reader_streams_rows_in_order() {
    let stats = SharedStats::default();
    let mut conn = connect(
        MockEngine::new(stats.clone()).with_query("SELECT * FROM users", vec![users()]),
    );

    let mut cursor = conn.query_reader("SELECT * FROM users").unwrap();
    assert_eq!(cursor.state(), CursorState::NotStarted);

    let row = cursor.next().unwrap().unwrap();
    assert_eq!(row.get(0).unwrap(), Value::Int(1));
    assert_eq!(row.raw(1).unwrap(), Some(&b"alice"[..]));
    assert_eq!(cursor.state(), CursorState::HasRow);

    let row = cursor.next().unwrap().unwrap();
    assert_eq!(row.get(0).unwrap(), Value::Int(2));
    assert!(row.is_null(1).unwrap());

    assert!(cursor.next().unwrap().is_none());
    assert_eq!(cursor.state(), CursorState::Exhausted);
    assert_eq!(cursor.rowcount(), 2);

    // Terminal: no further engine calls.
    assert!(cursor.next().unwrap().is_none());
    drop(cursor);
    assert_eq!(stats.get().raw_fetches, 3);
    assert_eq!(stats.get().open_modes, vec![FetchMode::Streaming]);
}

#[test]
fn test_zero_row_query_is_exhausted_on_first_fetch() {
    let empty = ResultSet::rows(vec![column("id", ServerType::Long)], &[]);
    let mut conn = connect(
        MockEngine::new(SharedStats::default()).with_query("SELECT id FROM t", vec![empty]),
    );

    let mut cursor = conn.query_reader("SELECT id FROM t").unwrap();
    assert_eq!(cursor.state(), CursorState::NotStarted);
    assert!(cursor.next().unwrap().is_none());
    assert_eq!(cursor.state(), CursorState::Exhausted);
    assert_eq!(cursor.rowcount(), 0);
}

#[test]
fn test_engine_rejects_commands_while_results_unread() {
    let mut engine = MockEngine::new(SharedStats::default())
        .with_query("SELECT * FROM users", vec![users()]);
    engine.query("SELECT * FROM users").unwrap();
    let err = engine.query("SELECT * FROM users").unwrap_err();
    assert_eq!(err.code, 2014);
}

#[test]
fn test_trailing_result_sets_are_drained_before_next_query() {
    let stats = SharedStats::default();
    let multi = "SELECT 1; SELECT 2; SELECT 3";
    let one = |v: &'static str| {
        ResultSet::rows(vec![column("v", ServerType::LongLong)], &[&[Some(v)]])
    };
    let mut conn = connect(
        MockEngine::new(stats.clone())
            .with_query(multi, vec![one("1"), one("2"), one("3")])
            .with_query("SELECT * FROM users", vec![users()]),
    );

    {
        let mut cursor = conn.query_reader(multi).unwrap();
        let row = cursor.next().unwrap().unwrap();
        assert_eq!(row.get(0).unwrap(), Value::Int(1));
    }
    assert_eq!(stats.get().discarded_sets, 2);
    assert!(!conn.engine().out_of_sync());

    let result = conn.query_table("SELECT * FROM users").unwrap();
    assert_eq!(result.len(), 2);
}

#[test]
fn test_leaked_cursor_is_drained_automatically() {
    let stats = SharedStats::default();
    let multi = "SELECT 1; SELECT 2; SELECT 3";
    let one = |v: &'static str| {
        ResultSet::rows(vec![column("v", ServerType::LongLong)], &[&[Some(v)]])
    };
    let mut conn = connect(
        MockEngine::new(stats.clone())
            .with_query(multi, vec![one("1"), one("2"), one("3")])
            .with_query("SELECT * FROM users", vec![users()]),
    );

    let cursor = conn.query_reader(multi).unwrap();
    std::mem::forget(cursor);
    assert!(conn.engine().out_of_sync());

    let result = conn.query_table("SELECT * FROM users").unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(stats.get().discarded_sets, 2);
}

#[test]
fn test_execute_reports_counts_without_fetching() {
    let stats = SharedStats::default();
    let insert = "INSERT INTO t (name) VALUES ('x')";
    let mut conn = connect(
        MockEngine::new(stats.clone()).with_query(insert, vec![ResultSet::mutation(1, 77)]),
    );

    let done = conn.execute(insert).unwrap();
    assert_eq!(done.affected_rows, 1);
    assert_eq!(done.insert_id, 77);
    assert_eq!(stats.get().raw_fetches, 0);
    assert_eq!(stats.get().open_modes, vec![FetchMode::None]);
    assert!(!conn.engine().out_of_sync());
}

#[test]
fn test_mutation_through_reader_is_exhausted_without_fetch() {
    let stats = SharedStats::default();
    let update = "UPDATE t SET a = 1";
    let mut conn = connect(
        MockEngine::new(stats.clone()).with_query(update, vec![ResultSet::mutation(3, 0)]),
    );

    let mut cursor = conn.query_reader(update).unwrap();
    assert!(cursor.columns().is_empty());
    assert_eq!(cursor.affected_rows(), 3);
    assert_eq!(cursor.insert_id(), 0);
    assert!(cursor.next().unwrap().is_none());
    assert_eq!(cursor.state(), CursorState::Exhausted);
    drop(cursor);
    assert_eq!(stats.get().raw_fetches, 0);
}

#[test]
fn test_execute_drains_multi_statement_mutations() {
    let stats = SharedStats::default();
    let sql = "INSERT INTO a VALUES (1); INSERT INTO b VALUES (2)";
    let mut conn = connect(MockEngine::new(stats.clone()).with_query(
        sql,
        vec![ResultSet::mutation(1, 5), ResultSet::mutation(1, 6)],
    ));

    let done = conn.execute(sql).unwrap();
    assert_eq!(done.insert_id, 5);
    assert_eq!(stats.get().discarded_sets, 1);
    assert!(!conn.engine().out_of_sync());
}

#[test]
fn test_execute_keeps_counts_when_trailing_set_fails() {
    let stats = SharedStats::default();
    let sql = "INSERT INTO a VALUES (1); INSERT INTO missing VALUES (2)";
    let bad = ResultSet::default().failing_discard(1146, "Table 'test.missing' doesn't exist");
    let mut conn = connect(
        MockEngine::new(stats.clone())
            .with_query(sql, vec![ResultSet::mutation(1, 5), bad])
            .with_query("SELECT * FROM users", vec![users()]),
    );

    let done = conn.execute(sql).unwrap();
    assert_eq!(done.affected_rows, 1);
    assert_eq!(done.insert_id, 5);
    assert!(!conn.engine().out_of_sync());
    assert_eq!(conn.query_table("SELECT * FROM users").unwrap().len(), 2);
}

#[test]
fn test_fetch_error_marks_cursor_errored() {
    let failing = users().failing_after(1);
    let mut conn = connect(
        MockEngine::new(SharedStats::default()).with_query("SELECT * FROM users", vec![failing]),
    );

    let mut cursor = conn.query_reader("SELECT * FROM users").unwrap();
    assert!(cursor.next().unwrap().is_some());
    match cursor.next() {
        Err(Error::Fetch { code, .. }) => assert_eq!(code, 2013),
        other => panic!("expected fetch error, got {:?}", other.map(|r| r.is_some())),
    }
    assert_eq!(cursor.state(), CursorState::Errored);
    assert!(cursor.next().unwrap().is_none());
}

#[test]
fn test_query_syntax_error_carries_code_and_query() {
    let mut conn = connect(MockEngine::new(SharedStats::default()));
    match conn.query_table("SELEC 1") {
        Err(Error::Execution { code, query, .. }) => {
            assert_eq!(code, 1064);
            assert_eq!(query.as_deref(), Some("SELEC 1"));
        }
        other => panic!("expected execution error, got {:?}", other.map(|r| r.len())),
    }
}

#[test]
fn test_fetch_after_close_is_state_error() {
    let mut conn = connect(
        MockEngine::new(SharedStats::default()).with_query("SELECT * FROM users", vec![users()]),
    );
    let mut cursor = conn.query_reader("SELECT * FROM users").unwrap();
    cursor.close().unwrap();
    assert!(cursor.is_closed());
    assert!(cursor.next().unwrap_err().is_protocol_state());
    cursor.close().unwrap();
}

#[test]
fn test_drain_failure_reported_from_close() {
    let sql = "SELECT 1; SELECT broken";
    let one = ResultSet::rows(vec![column("v", ServerType::LongLong)], &[&[Some("1")]]);
    let bad = ResultSet::default().failing_discard(1054, "Unknown column 'broken'");
    let mut conn = connect(
        MockEngine::new(SharedStats::default())
            .with_query(sql, vec![one, bad])
            .with_query("SELECT * FROM users", vec![users()]),
    );

    let mut cursor = conn.query_reader(sql).unwrap();
    match cursor.close() {
        Err(Error::Execution { code, .. }) => assert_eq!(code, 1054),
        other => panic!("expected execution error, got {:?}", other),
    }
    drop(cursor);

    assert_eq!(conn.query_table("SELECT * FROM users").unwrap().len(), 2);
}

#[test]
fn test_operations_after_close_fail() {
    let stats = SharedStats::default();
    let mut conn = connect(MockEngine::new(stats.clone()));
    conn.close().unwrap();
    conn.close().unwrap();
    assert!(conn.is_closed());
    assert_eq!(stats.get().engine_closes, 1);

    assert!(matches!(conn.query_table("SELECT 1"), Err(Error::ConnectionClosed)));
    assert!(matches!(conn.execute("DELETE FROM t"), Err(Error::ConnectionClosed)));
    assert!(matches!(conn.prepare("SELECT 1"), Err(Error::ConnectionClosed)));
    assert!(matches!(conn.ping(), Err(Error::ConnectionClosed)));

    drop(conn);
    assert_eq!(stats.get().engine_closes, 1);
}

#[test]
fn test_drop_closes_connection() {
    let stats = SharedStats::default();
    drop(connect(MockEngine::new(stats.clone())));
    assert_eq!(stats.get().engine_closes, 1);
}

#[test]
fn test_transaction_pass_through() {
    let stats = SharedStats::default();
    let ok = || vec![ResultSet::mutation(0, 0)];
    let mut conn = connect(
        MockEngine::new(stats.clone())
            .with_query("START TRANSACTION", ok())
            .with_query("COMMIT", ok())
            .with_query("ROLLBACK", ok())
            .with_query("SET autocommit=0", ok()),
    );

    conn.set_autocommit(false).unwrap();
    assert!(!conn.autocommit());
    conn.begin().unwrap();
    conn.commit().unwrap();
    conn.rollback().unwrap();
    conn.ping().unwrap();

    assert_eq!(
        stats.get().queries,
        vec!["SET autocommit=0", "START TRANSACTION", "COMMIT", "ROLLBACK"]
    );
}
