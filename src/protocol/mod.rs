//! Building blocks shared by connections, statements and cursors.

pub mod buffer;
pub mod connect;
pub mod constants;
pub mod decode;
pub mod engine;
pub mod types;

pub use buffer::{ColumnBuffer, RowBufferCache};
pub use connect::ConnectParams;
pub use engine::{
    DatabaseEngine, EngineError, EngineResult, FetchMode, FetchStatus, RawRow, StatementHandle,
};
pub use types::{
    BoundRow, BufferSize, ColumnFlags, ColumnMetadata, OutputBinding, ParamValue, ResultMetadata,
    Row, RowView, ServerType, TextRow, Value,
};
