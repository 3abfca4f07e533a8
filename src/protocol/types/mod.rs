//! MySQL column types, metadata and values for query results.

mod fetch_var;
mod metadata;
mod param;
mod row;
mod server_type;
mod value;

pub use fetch_var::{build_output_bindings, OutputBinding};
pub use metadata::{ColumnFlags, ColumnMetadata, ResultMetadata};
pub use param::ParamValue;
pub use row::{BoundRow, Row, RowView, TextRow};
pub use server_type::{BufferSize, ServerType};
pub use value::Value;
