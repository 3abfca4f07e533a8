//! The database engine seam.
//!
//! `DatabaseEngine` is the synchronous client library this crate drives: it
//! owns the socket, speaks the wire protocol and hands back raw rows and
//! field metadata. `StatementHandle` is the engine's prepared-statement
//! handle. Everything above these traits (result modes, buffer management,
//! cursor state and result-set draining) lives in this crate.
//!
//! Implementations are entered through a single `&mut` gateway per
//! connection or statement, so they need no thread-local initialization and
//! may be moved between threads if they are `Send`.

use bytes::Bytes;
use thiserror::Error;

use crate::protocol::buffer::ColumnBuffer;
use crate::protocol::connect::ConnectParams;
use crate::protocol::types::{ColumnMetadata, OutputBinding, ParamValue};

/// Failure reported by the engine, with the server or client error number.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (errno {code})")]
pub struct EngineError {
    pub code: u32,
    pub message: String,
}

impl EngineError {
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Result type for engine primitives.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// How a result set is materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Rows are not read; only affected-row-count and insert id matter.
    None,
    /// The whole result is transferred to the client before iteration.
    Buffered,
    /// Rows are pulled from the server one at a time.
    Streaming,
}

/// One text-protocol row. `None` cells are SQL NULL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub values: Vec<Option<Bytes>>,
}

impl RawRow {
    pub fn new(values: Vec<Option<Bytes>>) -> Self {
        Self { values }
    }

    /// Byte length of each cell (0 for NULL).
    pub fn lengths(&self) -> Vec<usize> {
        self.values
            .iter()
            .map(|v| v.as_ref().map_or(0, Bytes::len))
            .collect()
    }
}

/// Outcome of fetching into bound output buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// Every column fit in its bound buffer.
    Row,
    /// At least one column reported a length larger than its bound buffer.
    Truncated,
    /// No more rows.
    NoData,
    /// Fetch failed; details via the handle's last error.
    Error,
}

/// Connection-level engine primitives.
pub trait DatabaseEngine {
    /// Prepared-statement handle type.
    type Statement: StatementHandle;

    /// Open a connection.
    fn connect(params: &ConnectParams) -> EngineResult<Self>
    where
        Self: Sized;

    /// Close the connection. Called at most once.
    fn close(&mut self);

    /// Server-side connection (thread) id.
    fn thread_id(&self) -> u64;

    fn ping(&mut self) -> EngineResult<()>;

    /// Send a query. Results, if any, become the current result set.
    fn query(&mut self, sql: &str) -> EngineResult<()>;

    /// Open the current result set. `Ok(None)` means the statement produced
    /// no result columns.
    fn open_result(&mut self, mode: FetchMode) -> EngineResult<Option<Vec<ColumnMetadata>>>;

    /// Rows affected by the last query (row count for buffered results).
    fn affected_rows(&self) -> u64;

    /// AUTO_INCREMENT id generated by the last query.
    fn insert_id(&self) -> u64;

    /// Fetch the next text row. `None` is end of data unless
    /// `last_error_code` is nonzero.
    fn fetch_raw_row(&mut self) -> Option<RawRow>;

    /// Release the current result set, discarding unread rows.
    fn free_result(&mut self);

    /// Whether further result sets follow the current one.
    fn has_more_result_sets(&self) -> bool;

    /// Advance to the next result set and discard it entirely.
    fn discard_result_set(&mut self) -> EngineResult<()>;

    /// Prepare a statement.
    fn prepare(&mut self, sql: &str) -> EngineResult<Self::Statement>;

    fn last_error_code(&self) -> u32;

    fn last_error_message(&self) -> String;

    fn last_error(&self) -> EngineError {
        EngineError::new(self.last_error_code(), self.last_error_message())
    }
}

/// Prepared-statement engine primitives.
pub trait StatementHandle {
    /// Number of `?` placeholders.
    fn param_count(&self) -> usize;

    fn bind_inputs(&mut self, params: &[ParamValue]) -> EngineResult<()>;

    /// Describe the statement's output columns.
    fn describe_output_columns(&mut self) -> EngineResult<Vec<ColumnMetadata>>;

    /// Ask the engine to report true value lengths on fetch rather than
    /// declared maximums.
    fn report_true_lengths(&mut self) -> EngineResult<()>;

    fn execute(&mut self) -> EngineResult<()>;

    /// Transfer the whole result to the client.
    fn store_result(&mut self) -> EngineResult<()>;

    /// Declare output column types and initial buffer lengths.
    fn bind_outputs(&mut self, bindings: &[OutputBinding]) -> EngineResult<()>;

    fn affected_rows(&self) -> u64;

    fn insert_id(&self) -> u64;

    /// Fetch the next row into `outputs`.
    ///
    /// For each column the engine sets the reported length and null flag and
    /// writes as many bytes as fit in `ColumnBuffer::bound_mut`.
    fn fetch_bound(&mut self, outputs: &mut [ColumnBuffer]) -> FetchStatus;

    /// Re-read one column of the current row into `output.bound_mut()`,
    /// which is at least the reported length.
    fn fetch_column(&mut self, index: usize, output: &mut ColumnBuffer) -> EngineResult<()>;

    /// Discard any remaining rows of the current execution.
    fn free_result(&mut self);

    /// Close the server-side statement. Called at most once.
    fn close(&mut self) -> EngineResult<()>;

    fn last_error_code(&self) -> u32;

    fn last_error_message(&self) -> String;

    fn last_error(&self) -> EngineError {
        EngineError::new(self.last_error_code(), self.last_error_message())
    }
}
