//! High-level Connection API.
//!
//! A `Connection` owns one engine connection and runs direct queries on it.
//! The engine can only process one command at a time, and a multi-statement
//! query may leave several result sets behind the one the caller sees. The
//! connection therefore records when a result is pending and drains it,
//! together with every trailing result set, before sending the next command.
//! While a prepared statement streams rows the connection refuses commands.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cursor::{Cursor, QueryCursor};
use crate::error::{Error, Result};
use crate::protocol::connect::ConnectParams;
use crate::protocol::engine::{DatabaseEngine, FetchMode};
use crate::protocol::types::{ColumnMetadata, ResultMetadata, Row};
use crate::session::Session;
use crate::statement::Statement;

/// Outcome of an execution that does not read rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Rows affected.
    pub affected_rows: u64,
    /// AUTO_INCREMENT id generated, 0 if none.
    pub insert_id: u64,
}

/// Fully materialized result of a query.
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// Column metadata.
    pub metadata: Arc<ResultMetadata>,
    /// Rows returned.
    pub rows: Vec<Row>,
    /// Rows affected (the row count for buffered selects).
    pub affected_rows: u64,
    /// AUTO_INCREMENT id generated, 0 if none.
    pub insert_id: u64,
}

impl QueryResult {
    /// Get the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the result is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column metadata.
    pub fn columns(&self) -> &[ColumnMetadata] {
        &self.metadata.columns
    }

    /// Get column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.metadata.column_names()
    }

    /// Iterate over rows.
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }
}

impl IntoIterator for QueryResult {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// A MySQL database connection.
pub struct Connection<E: DatabaseEngine> {
    engine: E,
    /// Closed and pending-result flags, shared with prepared statements.
    session: Arc<Session>,
    /// Whether auto-commit is enabled.
    autocommit: bool,
}

impl<E: DatabaseEngine> Connection<E> {
    /// Connect with explicit connection parameters.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mysql_rowbind::{ConnectParams, Connection, DatabaseEngine, Result};
    ///
    /// fn open<E: DatabaseEngine>() -> Result<Connection<E>> {
    ///     let params = ConnectParams::new("localhost", "app", "secret")
    ///         .with_database("shop")
    ///         .enable_multi_statements();
    ///     Connection::connect(&params)
    /// }
    /// ```
    pub fn connect(params: &ConnectParams) -> Result<Self> {
        debug!(
            address = %params.address(),
            user = %params.user,
            database = ?params.database,
            "connecting"
        );
        let engine = E::connect(params).map_err(Error::connection)?;
        let conn = Self::from_engine(engine);
        debug!(thread_id = conn.id(), "connected");
        Ok(conn)
    }

    /// Wrap an already connected engine.
    pub fn from_engine(engine: E) -> Self {
        Self {
            engine,
            session: Arc::new(Session::default()),
            autocommit: true,
        }
    }

    /// Server-side connection id.
    pub fn id(&self) -> u64 {
        self.engine.thread_id()
    }

    /// The underlying engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn is_closed(&self) -> bool {
        self.session.is_closed()
    }

    /// Check if the connection is alive.
    pub fn ping(&mut self) -> Result<()> {
        self.begin_command()?;
        self.engine.ping().map_err(Error::connection)
    }

    /// Close the connection. Closing again is a no-op.
    ///
    /// Statements prepared on this connection fail with `ConnectionClosed`
    /// from then on.
    pub fn close(&mut self) -> Result<()> {
        if self.session.is_closed() {
            return Ok(());
        }
        let drained = self.finish_pending_results();
        self.engine.close();
        self.session.mark_closed();
        debug!("connection closed");
        drained
    }

    /// Execute a statement without reading rows.
    ///
    /// Trailing result sets are drained before this returns. The counts
    /// describe the first statement and are returned even if a trailing
    /// set fails to drain; that failure is logged.
    pub fn execute(&mut self, sql: &str) -> Result<ExecResult> {
        let (_, done) = self.start_query(sql, FetchMode::None)?;
        if let Err(e) = self.finish_pending_results() {
            warn!(error = %e, sql, "failed to drain trailing result sets");
        }
        Ok(done)
    }

    /// Run a query and stream its rows.
    ///
    /// The cursor borrows the connection; no other command can be issued
    /// until it is dropped.
    pub fn query_reader(&mut self, sql: &str) -> Result<QueryCursor<'_, E>> {
        self.open_cursor(sql, FetchMode::Streaming)
    }

    /// Run a query and decode every row of its first result set.
    pub fn query_table(&mut self, sql: &str) -> Result<QueryResult> {
        let mut cursor = self.open_cursor(sql, FetchMode::Buffered)?;
        let rows = cursor.fetch_all()?;
        cursor.close()?;
        Ok(QueryResult {
            metadata: Arc::clone(cursor.metadata()),
            rows,
            affected_rows: cursor.affected_rows(),
            insert_id: cursor.insert_id(),
        })
    }

    /// Prepare a statement.
    pub fn prepare(&mut self, sql: &str) -> Result<Statement<E::Statement>> {
        self.begin_command()?;
        let handle = self
            .engine
            .prepare(sql)
            .map_err(|e| Error::execution(e, Some(sql)))?;
        let stmt = Statement::new(handle, sql, Arc::clone(&self.session));
        debug!(sql, params = stmt.num_input(), "prepared statement");
        Ok(stmt)
    }

    /// Start a transaction.
    pub fn begin(&mut self) -> Result<()> {
        self.execute("START TRANSACTION").map(|_| ())
    }

    pub fn commit(&mut self) -> Result<()> {
        self.execute("COMMIT").map(|_| ())
    }

    pub fn rollback(&mut self) -> Result<()> {
        self.execute("ROLLBACK").map(|_| ())
    }

    /// Set auto-commit mode.
    pub fn set_autocommit(&mut self, autocommit: bool) -> Result<()> {
        let sql = if autocommit {
            "SET autocommit=1"
        } else {
            "SET autocommit=0"
        };
        self.execute(sql)?;
        self.autocommit = autocommit;
        Ok(())
    }

    /// Get auto-commit mode.
    pub fn autocommit(&self) -> bool {
        self.autocommit
    }

    fn begin_command(&mut self) -> Result<()> {
        self.session.check_connection_command()?;
        self.finish_pending_results()
    }

    fn open_cursor(&mut self, sql: &str, mode: FetchMode) -> Result<QueryCursor<'_, E>> {
        let (metadata, done) = self.start_query(sql, mode)?;
        Ok(QueryCursor::new(
            self,
            metadata,
            mode,
            done.affected_rows,
            done.insert_id,
        ))
    }

    fn start_query(
        &mut self,
        sql: &str,
        mode: FetchMode,
    ) -> Result<(Arc<ResultMetadata>, ExecResult)> {
        self.begin_command()?;
        debug!(sql, mode = ?mode, "query");
        self.engine
            .query(sql)
            .map_err(|e| Error::execution(e, Some(sql)))?;
        self.session.set_result_pending();

        let columns = match self.engine.open_result(mode) {
            Ok(columns) => columns.unwrap_or_default(),
            Err(e) => {
                let err = Error::execution(e, Some(sql));
                if let Err(drain) = self.finish_pending_results() {
                    warn!(error = %drain, "failed to drain results after query error");
                }
                return Err(err);
            }
        };
        let done = ExecResult {
            affected_rows: self.engine.affected_rows(),
            insert_id: self.engine.insert_id(),
        };
        Ok((Arc::new(ResultMetadata::new(columns)), done))
    }

    pub(crate) fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Free the current result and discard every trailing result set.
    pub(crate) fn finish_pending_results(&mut self) -> Result<()> {
        if !self.session.take_result_pending() {
            return Ok(());
        }
        self.engine.free_result();

        let mut drained = 0usize;
        while self.engine.has_more_result_sets() {
            self.engine
                .discard_result_set()
                .map_err(|e| Error::execution(e, None))?;
            drained += 1;
        }
        if drained > 0 {
            debug!(drained, "discarded trailing result sets");
        }
        Ok(())
    }
}

impl<E: DatabaseEngine> Drop for Connection<E> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "error while closing connection");
        }
    }
}
