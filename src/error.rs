//! Error types for the MySQL result layer.

use crate::protocol::constants::CR_SERVER_GONE_ERROR;
use crate::protocol::engine::EngineError;
use thiserror::Error;

/// Result type alias for MySQL operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for connection, statement and cursor operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Connecting or authenticating failed.
    #[error("Connection failed: {message} (errno {code})")]
    Connection { code: u32, message: String },

    /// The server rejected a query or statement.
    #[error("{message} (errno {code}){}", query_suffix(.query))]
    Execution {
        code: u32,
        message: String,
        query: Option<String>,
    },

    /// Row retrieval failed mid-stream.
    #[error("Fetch failed: {message} (errno {code})")]
    Fetch { code: u32, message: String },

    /// A column buffer could not be allocated.
    #[error("Failed to allocate {requested} bytes for a column buffer")]
    Allocation { requested: usize },

    /// The connection was closed.
    #[error("Connection is closed (errno {})", CR_SERVER_GONE_ERROR)]
    ConnectionClosed,

    /// The prepared statement was closed.
    #[error("Statement is closed")]
    StatementClosed,

    /// Operation invoked in a state that does not allow it.
    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    /// Parameter bindings do not match the prepared parameter count.
    #[error("Statement expects {expected} parameters, got {bound}")]
    ParameterCount { expected: usize, bound: usize },

    /// Type conversion error.
    #[error("Type conversion error: {message}")]
    TypeConversion { message: String },

    /// Column not found.
    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },

    /// Column index out of bounds.
    #[error("Column index {index} out of bounds (columns: {count})")]
    ColumnIndexOutOfBounds { index: usize, count: usize },

    /// Null value error.
    #[error("Unexpected NULL value in column {column}")]
    NullValue { column: String },
}

fn query_suffix(query: &Option<String>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!(" during query: {}", q),
        _ => String::new(),
    }
}

impl Error {
    /// Create an execution error from an engine failure.
    pub fn execution(err: EngineError, query: Option<&str>) -> Self {
        Self::Execution {
            code: err.code,
            message: err.message,
            query: query.map(str::to_string),
        }
    }

    /// Create a connection error from an engine failure.
    pub fn connection(err: EngineError) -> Self {
        Self::Connection {
            code: err.code,
            message: err.message,
        }
    }

    /// Create a fetch error from an engine failure.
    pub fn fetch(err: EngineError) -> Self {
        Self::Fetch {
            code: err.code,
            message: err.message,
        }
    }

    /// Create an invalid-state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a type conversion error.
    pub fn type_conversion(message: impl Into<String>) -> Self {
        Self::TypeConversion {
            message: message.into(),
        }
    }

    /// Engine error number, if this error carries one.
    pub fn code(&self) -> Option<u32> {
        match self {
            Error::Connection { code, .. }
            | Error::Execution { code, .. }
            | Error::Fetch { code, .. } => Some(*code),
            Error::ConnectionClosed => Some(CR_SERVER_GONE_ERROR),
            _ => None,
        }
    }

    /// Whether the operation was rejected because of session or cursor state.
    pub fn is_protocol_state(&self) -> bool {
        matches!(
            self,
            Error::ConnectionClosed | Error::StatementClosed | Error::InvalidState { .. }
        )
    }
}
