//! Cursors for iterating over query results.
//!
//! The `Cursor` trait defines the common interface. `QueryCursor` walks the
//! text-protocol rows of a direct connection query; `StatementCursor` walks
//! the bound output buffers of a prepared statement. Both hand out a
//! `RowView` that borrows the cursor, so row data is valid only until the
//! next call to `next()`. Copy it with `RowView::to_row` to keep it.
//!
//! # State
//!
//! A cursor starts `NotStarted`. Every `next()` moves it to `HasRow`,
//! `Exhausted` or `Errored`. The last two are terminal: further calls return
//! `Ok(None)` without touching the engine. Calling `next()` after `close()`
//! is an `InvalidState` error.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::protocol::constants::CR_UNKNOWN_ERROR;
use crate::protocol::engine::{
    DatabaseEngine, EngineError, FetchMode, FetchStatus, RawRow, StatementHandle,
};
use crate::protocol::types::{BoundRow, ColumnMetadata, ResultMetadata, Row, RowView, TextRow};
use crate::statement::Statement;

/// Position of a cursor in its result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    NotStarted,
    HasRow,
    Exhausted,
    Errored,
}

impl CursorState {
    pub fn is_terminal(self) -> bool {
        matches!(self, CursorState::Exhausted | CursorState::Errored)
    }
}

/// Base trait for all cursor types.
///
/// A cursor holds a mutable borrow of the connection or statement that
/// produced it, so at most one cursor is active per session.
///
/// # Example
///
/// ```no_run
/// use mysql_rowbind::{Connection, Cursor, DatabaseEngine, Result};
///
/// fn count_rows<C: Cursor>(cursor: &mut C) -> Result<u64> {
///     let mut count = 0;
///     while cursor.next()?.is_some() {
///         count += 1;
///     }
///     Ok(count)
/// }
///
/// fn run<E: DatabaseEngine>(conn: &mut Connection<E>) -> Result<u64> {
///     let mut cursor = conn.query_reader("SELECT * FROM users")?;
///     count_rows(&mut cursor)
/// }
/// ```
pub trait Cursor {
    /// Metadata shared by every row.
    fn metadata(&self) -> &Arc<ResultMetadata>;

    /// Column metadata for this cursor.
    fn columns(&self) -> &[ColumnMetadata] {
        &self.metadata().columns
    }

    fn state(&self) -> CursorState;

    /// Number of rows fetched so far.
    fn rowcount(&self) -> u64;

    /// Rows affected by the execution that produced this cursor.
    fn affected_rows(&self) -> u64;

    /// Insert id generated by the execution that produced this cursor.
    fn insert_id(&self) -> u64;

    fn is_closed(&self) -> bool;

    /// Close the cursor and release its result set.
    fn close(&mut self) -> Result<()>;

    /// Fetch the next row.
    ///
    /// Returns `Ok(None)` when exhausted.
    fn next(&mut self) -> Result<Option<RowView<'_>>>;

    /// Decode every remaining row.
    fn fetch_all(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(view) = self.next()? {
            rows.push(view.to_row()?);
        }
        Ok(rows)
    }
}

/// Cursor over a direct connection query.
///
/// Closing the cursor (explicitly or on drop) frees the result and drains any
/// trailing result sets so the connection is ready for the next command.
pub struct QueryCursor<'conn, E: DatabaseEngine> {
    conn: &'conn mut Connection<E>,
    metadata: Arc<ResultMetadata>,
    mode: FetchMode,
    state: CursorState,
    current: Option<RawRow>,
    rows_fetched: u64,
    affected_rows: u64,
    insert_id: u64,
    closed: bool,
}

impl<'conn, E: DatabaseEngine> QueryCursor<'conn, E> {
    pub(crate) fn new(
        conn: &'conn mut Connection<E>,
        metadata: Arc<ResultMetadata>,
        mode: FetchMode,
        affected_rows: u64,
        insert_id: u64,
    ) -> Self {
        Self {
            conn,
            metadata,
            mode,
            state: CursorState::NotStarted,
            current: None,
            rows_fetched: 0,
            affected_rows,
            insert_id,
            closed: false,
        }
    }

    /// How the result is being materialized.
    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    /// Get column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.metadata.column_names()
    }
}

impl<E: DatabaseEngine> Cursor for QueryCursor<'_, E> {
    fn metadata(&self) -> &Arc<ResultMetadata> {
        &self.metadata
    }

    fn state(&self) -> CursorState {
        self.state
    }

    fn rowcount(&self) -> u64 {
        self.rows_fetched
    }

    fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    fn insert_id(&self) -> u64 {
        self.insert_id
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.current = None;
        debug!(rows = self.rows_fetched, "closing query cursor");
        self.conn.finish_pending_results()
    }

    fn next(&mut self) -> Result<Option<RowView<'_>>> {
        if self.closed {
            return Err(Error::invalid_state("fetch on a closed cursor"));
        }
        if self.state.is_terminal() {
            return Ok(None);
        }
        self.current = None;
        if self.metadata.is_empty() {
            self.state = CursorState::Exhausted;
            return Ok(None);
        }

        let engine = self.conn.engine_mut();
        let Some(raw) = engine.fetch_raw_row() else {
            if engine.last_error_code() != 0 {
                self.state = CursorState::Errored;
                return Err(Error::fetch(engine.last_error()));
            }
            self.state = CursorState::Exhausted;
            return Ok(None);
        };

        if raw.values.len() != self.metadata.len() {
            self.state = CursorState::Errored;
            return Err(Error::fetch(EngineError::new(
                CR_UNKNOWN_ERROR,
                format!(
                    "row has {} values, result has {} columns",
                    raw.values.len(),
                    self.metadata.len()
                ),
            )));
        }

        self.state = CursorState::HasRow;
        self.rows_fetched += 1;
        let raw = self.current.insert(raw);
        Ok(Some(RowView::Text(TextRow::new(&self.metadata, &raw.values))))
    }
}

impl<E: DatabaseEngine> Drop for QueryCursor<'_, E> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "failed to drain results while dropping cursor");
        }
    }
}

/// Cursor over a prepared statement's bound output buffers.
///
/// Closing the cursor discards the execution's remaining rows. Prepared
/// statements produce a single result set, so nothing further is drained.
/// A streaming cursor holds the connection's command channel until its rows
/// run out or it is closed.
pub struct StatementCursor<'stmt, S: StatementHandle> {
    stmt: &'stmt mut Statement<S>,
    metadata: Arc<ResultMetadata>,
    mode: FetchMode,
    state: CursorState,
    rows_fetched: u64,
    affected_rows: u64,
    insert_id: u64,
    closed: bool,
}

impl<'stmt, S: StatementHandle> StatementCursor<'stmt, S> {
    pub(crate) fn new(
        stmt: &'stmt mut Statement<S>,
        metadata: Arc<ResultMetadata>,
        mode: FetchMode,
        affected_rows: u64,
        insert_id: u64,
    ) -> Self {
        Self {
            stmt,
            metadata,
            mode,
            state: CursorState::NotStarted,
            rows_fetched: 0,
            affected_rows,
            insert_id,
            closed: false,
        }
    }

    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    /// Get column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.metadata.column_names()
    }

    /// Current capacity of a column's output buffer.
    pub fn buffer_capacity(&self, index: usize) -> Option<usize> {
        self.stmt.buffer_capacity(index)
    }
}

impl<S: StatementHandle> Cursor for StatementCursor<'_, S> {
    fn metadata(&self) -> &Arc<ResultMetadata> {
        &self.metadata
    }

    fn state(&self) -> CursorState {
        self.state
    }

    fn rowcount(&self) -> u64 {
        self.rows_fetched
    }

    fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    fn insert_id(&self) -> u64 {
        self.insert_id
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        debug!(rows = self.rows_fetched, "closing statement cursor");
        self.stmt.free_result();
        Ok(())
    }

    fn next(&mut self) -> Result<Option<RowView<'_>>> {
        if self.closed {
            return Err(Error::invalid_state("fetch on a closed cursor"));
        }
        if self.state.is_terminal() {
            return Ok(None);
        }
        if self.metadata.is_empty() {
            self.state = CursorState::Exhausted;
            return Ok(None);
        }

        let (handle, cache) = match self.stmt.fetch_parts() {
            Ok(parts) => parts,
            Err(e) => {
                self.state = CursorState::Errored;
                return Err(e);
            }
        };
        let fetched = match handle.fetch_bound(cache.buffers_mut()) {
            FetchStatus::Row => Ok(true),
            FetchStatus::Truncated => cache.refetch_truncated(handle).map(|_| true),
            FetchStatus::NoData => Ok(false),
            FetchStatus::Error => Err(Error::fetch(handle.last_error())),
        };
        match fetched {
            Ok(true) => {}
            Ok(false) => {
                self.state = CursorState::Exhausted;
                self.stmt.end_stream();
                return Ok(None);
            }
            Err(e) => {
                self.state = CursorState::Errored;
                self.stmt.end_stream();
                return Err(e);
            }
        }

        self.state = CursorState::HasRow;
        self.rows_fetched += 1;
        Ok(Some(RowView::Bound(BoundRow::new(
            &self.metadata,
            self.stmt.buffers(),
        ))))
    }
}

impl<S: StatementHandle> Drop for StatementCursor<'_, S> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "failed to close statement cursor");
        }
    }
}
