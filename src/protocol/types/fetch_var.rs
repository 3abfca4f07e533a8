//! Output bindings for prepared-statement result columns.
//!
//! Before fetching, the statement tells the engine what it expects for each
//! column: the server type, whether it is unsigned, and how many bytes the
//! bound buffer can hold. Fixed-width columns always bind their full size.
//! Variable-width columns bind whatever length their buffer is currently
//! exposing, which is 0 right after an execute.

use crate::protocol::buffer::ColumnBuffer;

use super::metadata::ResultMetadata;
use super::server_type::ServerType;

/// Output binding for one result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputBinding {
    /// Type the column is fetched as.
    pub server_type: ServerType,
    /// Whether integer columns are fetched unsigned.
    pub unsigned: bool,
    /// Bytes available for the engine to write.
    pub buffer_length: usize,
}

impl OutputBinding {
    pub fn new(server_type: ServerType, unsigned: bool, buffer_length: usize) -> Self {
        Self {
            server_type,
            unsigned,
            buffer_length,
        }
    }

    /// Whether the engine may report a length larger than `buffer_length`.
    pub fn is_variable(&self) -> bool {
        self.server_type.buffer_size().is_variable()
    }
}

/// Build output bindings from column metadata and the current buffers.
///
/// `buffers` must hold one buffer per column, in column order.
pub fn build_output_bindings(
    metadata: &ResultMetadata,
    buffers: &[ColumnBuffer],
) -> Vec<OutputBinding> {
    metadata
        .iter()
        .zip(buffers)
        .map(|(col, buf)| {
            OutputBinding::new(col.server_type, col.flags.is_unsigned(), buf.bound_len())
        })
        .collect()
}
