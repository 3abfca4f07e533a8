//! Column metadata captured from the server's field descriptions.
//!
//! `ColumnMetadata` describes one output column. `ResultMetadata` is the
//! ordered set of columns for one executed query or prepared statement; it is
//! shared by every row of the result through an `Arc`.

use crate::protocol::constants::*;

use super::server_type::{BufferSize, ServerType};

/// Column flag bits reported by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnFlags(pub u32);

impl ColumnFlags {
    pub const NOT_NULL: ColumnFlags = ColumnFlags(NOT_NULL_FLAG);
    pub const PRI_KEY: ColumnFlags = ColumnFlags(PRI_KEY_FLAG);
    pub const UNIQUE_KEY: ColumnFlags = ColumnFlags(UNIQUE_KEY_FLAG);
    pub const MULTIPLE_KEY: ColumnFlags = ColumnFlags(MULTIPLE_KEY_FLAG);
    pub const BLOB: ColumnFlags = ColumnFlags(BLOB_FLAG);
    pub const UNSIGNED: ColumnFlags = ColumnFlags(UNSIGNED_FLAG);
    pub const ZEROFILL: ColumnFlags = ColumnFlags(ZEROFILL_FLAG);
    pub const BINARY: ColumnFlags = ColumnFlags(BINARY_FLAG);
    pub const ENUM: ColumnFlags = ColumnFlags(ENUM_FLAG);
    pub const AUTO_INCREMENT: ColumnFlags = ColumnFlags(AUTO_INCREMENT_FLAG);
    pub const TIMESTAMP: ColumnFlags = ColumnFlags(TIMESTAMP_FLAG);
    pub const SET: ColumnFlags = ColumnFlags(SET_FLAG);

    /// Check whether every bit of `other` is set.
    pub fn contains(self, other: ColumnFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_unsigned(self) -> bool {
        self.contains(Self::UNSIGNED)
    }

    pub fn is_binary(self) -> bool {
        self.contains(Self::BINARY)
    }

    pub fn is_nullable(self) -> bool {
        !self.contains(Self::NOT_NULL)
    }
}

impl std::ops::BitOr for ColumnFlags {
    type Output = ColumnFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        ColumnFlags(self.0 | rhs.0)
    }
}

/// Description of one result column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMetadata {
    /// Column name (alias if one was given).
    pub name: String,
    /// Server-reported type.
    pub server_type: ServerType,
    /// Flag bits.
    pub flags: ColumnFlags,
}

impl ColumnMetadata {
    /// Create column metadata with no flags set.
    pub fn new(name: impl Into<String>, server_type: ServerType) -> Self {
        Self {
            name: name.into(),
            server_type,
            flags: ColumnFlags::default(),
        }
    }

    /// Set the flag bits.
    pub fn with_flags(mut self, flags: ColumnFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Output buffer requirement for this column.
    pub fn buffer_size(&self) -> BufferSize {
        self.server_type.buffer_size()
    }

    pub fn nullable(&self) -> bool {
        self.flags.is_nullable()
    }
}

/// Ordered column descriptions for a result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultMetadata {
    /// Column definitions.
    pub columns: Vec<ColumnMetadata>,
}

impl ResultMetadata {
    /// Create new metadata from columns.
    pub fn new(columns: Vec<ColumnMetadata>) -> Self {
        Self { columns }
    }

    /// Metadata for a statement that produced no result columns.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get column by index.
    pub fn get(&self, index: usize) -> Option<&ColumnMetadata> {
        self.columns.get(index)
    }

    /// Iterate over columns.
    pub fn iter(&self) -> std::slice::Iter<'_, ColumnMetadata> {
        self.columns.iter()
    }

    /// Find column index by exact name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Find column index by name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.index_of(name).or_else(|| {
            self.columns
                .iter()
                .position(|c| c.name.eq_ignore_ascii_case(name))
        })
    }
}
