//! Prepared statements.
//!
//! A `Statement` owns the engine's statement handle, the result metadata
//! captured on the first execution that reads rows, and the column buffers
//! reused by every later execution. Buffers live until the statement is
//! closed; re-executing resets them and lets variable-width columns grow.
//!
//! A statement shares its connection's command channel. It cannot execute
//! after the connection is closed or while a direct query's results are
//! unread, and while its streaming cursor is open the connection refuses
//! other commands.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::connection::{ExecResult, QueryResult};
use crate::cursor::{Cursor, StatementCursor};
use crate::error::{Error, Result};
use crate::protocol::buffer::{ColumnBuffer, RowBufferCache};
use crate::protocol::engine::{FetchMode, StatementHandle};
use crate::protocol::types::{ParamValue, ResultMetadata};
use crate::session::Session;

/// A prepared statement.
///
/// # Example
///
/// ```no_run
/// use mysql_rowbind::{Connection, Cursor, DatabaseEngine, Result};
///
/// fn lookup<E: DatabaseEngine>(conn: &mut Connection<E>) -> Result<()> {
///     let mut stmt = conn.prepare("SELECT name, bio FROM t WHERE id = ?")?;
///     for id in [1i64, 2] {
///         stmt.clean_bind();
///         stmt.bind(id)?;
///         let mut cursor = stmt.query_reader()?;
///         while let Some(row) = cursor.next()? {
///             println!("{}", row.get(0)?);
///         }
///     }
///     stmt.close()
/// }
/// ```
pub struct Statement<S: StatementHandle> {
    /// `None` once closed.
    handle: Option<S>,
    sql: String,
    param_count: usize,
    params: Vec<ParamValue>,
    metadata: Option<Arc<ResultMetadata>>,
    cache: RowBufferCache,
    session: Arc<Session>,
    id: u64,
}

impl<S: StatementHandle> Statement<S> {
    pub(crate) fn new(handle: S, sql: &str, session: Arc<Session>) -> Self {
        let param_count = handle.param_count();
        let id = session.register_statement();
        Self {
            handle: Some(handle),
            sql: sql.to_string(),
            param_count,
            params: Vec::with_capacity(param_count),
            metadata: None,
            cache: RowBufferCache::new(),
            session,
            id,
        }
    }

    /// SQL text this statement was prepared from.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of `?` placeholders.
    pub fn num_input(&self) -> usize {
        self.param_count
    }

    /// Currently bound parameters.
    pub fn params(&self) -> &[ParamValue] {
        &self.params
    }

    /// Bind the next parameter.
    pub fn bind(&mut self, value: impl Into<ParamValue>) -> Result<()> {
        self.ensure_open()?;
        if self.params.len() >= self.param_count {
            return Err(Error::ParameterCount {
                expected: self.param_count,
                bound: self.params.len() + 1,
            });
        }
        self.params.push(value.into());
        Ok(())
    }

    /// Replace every binding at once.
    pub fn bind_all<I, T>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<ParamValue>,
    {
        self.ensure_open()?;
        let params: Vec<ParamValue> = values.into_iter().map(Into::into).collect();
        if params.len() != self.param_count {
            return Err(Error::ParameterCount {
                expected: self.param_count,
                bound: params.len(),
            });
        }
        self.params = params;
        Ok(())
    }

    /// Clear the bindings so the next `bind` starts at the first placeholder.
    pub fn clean_bind(&mut self) {
        self.params.clear();
    }

    /// Metadata captured by the first row-reading execution.
    pub fn metadata(&self) -> Option<&Arc<ResultMetadata>> {
        self.metadata.as_ref()
    }

    /// Current capacity of a column's output buffer.
    pub fn buffer_capacity(&self, index: usize) -> Option<usize> {
        self.cache.capacity(index)
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_none()
    }

    /// Execute without reading rows.
    pub fn execute(&mut self) -> Result<ExecResult> {
        self.run(FetchMode::None)
    }

    /// Execute and stream rows through the bound buffers.
    pub fn query_reader(&mut self) -> Result<StatementCursor<'_, S>> {
        self.open_cursor(FetchMode::Streaming)
    }

    /// Execute, transfer the whole result, and decode every row.
    pub fn query_table(&mut self) -> Result<QueryResult> {
        let mut cursor = self.open_cursor(FetchMode::Buffered)?;
        let rows = cursor.fetch_all()?;
        cursor.close()?;
        Ok(QueryResult {
            metadata: Arc::clone(cursor.metadata()),
            rows,
            affected_rows: cursor.affected_rows(),
            insert_id: cursor.insert_id(),
        })
    }

    /// Close the statement and release its buffers. Closing again is a no-op.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut handle) = self.handle.take() else {
            return Ok(());
        };
        let released = self.cache.release();
        debug!(sql = %self.sql, buffers = released, "closing statement");
        handle.free_result();
        self.session.end_stream(self.id);
        handle.close().map_err(|e| Error::execution(e, None))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.handle.is_none() {
            return Err(Error::StatementClosed);
        }
        Ok(())
    }

    fn open_cursor(&mut self, mode: FetchMode) -> Result<StatementCursor<'_, S>> {
        let done = self.run(mode)?;
        let metadata = self
            .metadata
            .clone()
            .unwrap_or_else(|| Arc::new(ResultMetadata::empty()));
        Ok(StatementCursor::new(
            self,
            metadata,
            mode,
            done.affected_rows,
            done.insert_id,
        ))
    }

    fn run(&mut self, mode: FetchMode) -> Result<ExecResult> {
        let handle = self.handle.as_mut().ok_or(Error::StatementClosed)?;
        self.session.check_statement_command(self.id)?;
        if self.params.len() != self.param_count {
            return Err(Error::ParameterCount {
                expected: self.param_count,
                bound: self.params.len(),
            });
        }
        let sql = self.sql.as_str();
        let exec_err = |e| Error::execution(e, Some(sql));

        // Rows left over from an abandoned execution.
        handle.free_result();
        self.session.end_stream(self.id);

        if self.param_count > 0 {
            handle.bind_inputs(&self.params).map_err(exec_err)?;
        }
        handle.execute().map_err(exec_err)?;
        debug!(sql = %sql, params = self.param_count, mode = ?mode, "executed statement");

        let done = ExecResult {
            affected_rows: handle.affected_rows(),
            insert_id: handle.insert_id(),
        };
        if mode == FetchMode::None {
            handle.free_result();
            return Ok(done);
        }

        let metadata = match &self.metadata {
            Some(metadata) => Arc::clone(metadata),
            None => {
                let columns = handle.describe_output_columns().map_err(exec_err)?;
                if !columns.is_empty() {
                    handle.report_true_lengths().map_err(exec_err)?;
                }
                debug!(columns = columns.len(), "captured statement metadata");
                let metadata = Arc::new(ResultMetadata::new(columns));
                self.metadata = Some(Arc::clone(&metadata));
                metadata
            }
        };
        if metadata.is_empty() {
            return Ok(done);
        }

        self.cache.prepare(&metadata)?;
        handle
            .bind_outputs(&self.cache.output_bindings(&metadata))
            .map_err(exec_err)?;
        match mode {
            FetchMode::Buffered => handle.store_result().map_err(exec_err)?,
            FetchMode::Streaming => self.session.begin_stream(self.id),
            FetchMode::None => {}
        }
        Ok(done)
    }

    pub(crate) fn fetch_parts(&mut self) -> Result<(&mut S, &mut RowBufferCache)> {
        let handle = self.handle.as_mut().ok_or(Error::StatementClosed)?;
        if self.session.is_closed() {
            return Err(Error::ConnectionClosed);
        }
        Ok((handle, &mut self.cache))
    }

    /// Hand the command channel back once the stream has ended.
    pub(crate) fn end_stream(&self) {
        self.session.end_stream(self.id);
    }

    pub(crate) fn buffers(&self) -> &[ColumnBuffer] {
        self.cache.buffers()
    }

    pub(crate) fn free_result(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            handle.free_result();
        }
        self.session.end_stream(self.id);
    }
}

impl<S: StatementHandle> Drop for Statement<S> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, sql = %self.sql, "failed to close statement");
        }
    }
}
