//! MySQL result materialization for Rust
//!
//! Connection, prepared statement and cursor handling on top of a blocking
//! MySQL client engine. The engine (anything implementing
//! [`DatabaseEngine`]) speaks the wire protocol; this crate decides how each
//! result is materialized, manages the per-column output buffers of prepared
//! statements, and drains trailing result sets so a connection is always
//! ready for its next command.
//!
//! Row views borrow their cursor and are valid only until the next fetch.
//! Use [`RowView::to_row`] to keep a row.
//!
//! # Example
//!
//! ```no_run
//! use mysql_rowbind::{ConnectParams, Connection, Cursor, DatabaseEngine, Result};
//!
//! fn report<E: DatabaseEngine>() -> Result<()> {
//!     let params = ConnectParams::new("localhost", "app", "secret").with_database("shop");
//!     let mut conn: Connection<E> = Connection::connect(&params)?;
//!
//!     let done = conn.execute("UPDATE orders SET shipped = 1 WHERE id = 7")?;
//!     println!("{} rows updated", done.affected_rows);
//!
//!     let mut cursor = conn.query_reader("SELECT id, total FROM orders")?;
//!     while let Some(row) = cursor.next()? {
//!         println!("{} {}", row.get(0)?, row.get_by_name("total")?);
//!     }
//!     drop(cursor);
//!
//!     conn.close()
//! }
//! ```

pub mod connection;
pub mod cursor;
pub mod error;
pub mod protocol;
mod session;
pub mod statement;

// Re-export main types
pub use connection::{Connection, ExecResult, QueryResult};
pub use cursor::{Cursor, CursorState, QueryCursor, StatementCursor};
pub use error::{Error, Result};
pub use protocol::buffer::{ColumnBuffer, RowBufferCache};
pub use protocol::connect::ConnectParams;
pub use protocol::engine::{
    DatabaseEngine, EngineError, EngineResult, FetchMode, FetchStatus, RawRow, StatementHandle,
};
pub use protocol::types::{
    BufferSize, ColumnFlags, ColumnMetadata, OutputBinding, ParamValue, ResultMetadata, Row,
    RowView, ServerType, Value,
};
pub use statement::Statement;
