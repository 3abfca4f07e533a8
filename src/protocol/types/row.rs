//! Row types for query results.
//!
//! `RowView` borrows the current row from its cursor: text-protocol cells for
//! connection queries, bound column buffers for prepared statements. It is
//! valid until the cursor advances. `Row` is an owned, decoded copy.

use std::sync::Arc;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::protocol::buffer::ColumnBuffer;
use crate::protocol::decode::{decode_bound_value, decode_text_value};

use super::metadata::{ColumnMetadata, ResultMetadata};
use super::value::Value;

/// Current row of a connection query.
#[derive(Debug, Clone, Copy)]
pub struct TextRow<'a> {
    metadata: &'a Arc<ResultMetadata>,
    values: &'a [Option<Bytes>],
}

impl<'a> TextRow<'a> {
    pub fn new(metadata: &'a Arc<ResultMetadata>, values: &'a [Option<Bytes>]) -> Self {
        Self { metadata, values }
    }
}

/// Current row of a prepared statement.
#[derive(Debug, Clone, Copy)]
pub struct BoundRow<'a> {
    metadata: &'a Arc<ResultMetadata>,
    buffers: &'a [ColumnBuffer],
}

impl<'a> BoundRow<'a> {
    pub fn new(metadata: &'a Arc<ResultMetadata>, buffers: &'a [ColumnBuffer]) -> Self {
        Self { metadata, buffers }
    }
}

/// Borrowed view of a cursor's current row.
#[derive(Debug, Clone, Copy)]
pub enum RowView<'a> {
    Text(TextRow<'a>),
    Bound(BoundRow<'a>),
}

impl<'a> RowView<'a> {
    fn shared_metadata(&self) -> &'a Arc<ResultMetadata> {
        match *self {
            RowView::Text(TextRow { metadata, .. }) => metadata,
            RowView::Bound(BoundRow { metadata, .. }) => metadata,
        }
    }

    /// Column metadata for this row.
    pub fn metadata(&self) -> &'a ResultMetadata {
        self.shared_metadata()
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        match self {
            RowView::Text(row) => row.values.len(),
            RowView::Bound(row) => row.buffers.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn column(&self, index: usize) -> Result<&'a ColumnMetadata> {
        let count = self.len();
        self.metadata()
            .get(index)
            .filter(|_| index < count)
            .ok_or(Error::ColumnIndexOutOfBounds { index, count })
    }

    /// Raw bytes of a column, `None` for NULL.
    ///
    /// Text cells are the server's textual rendering; bound cells are the
    /// native encoding written by the engine.
    pub fn raw(&self, index: usize) -> Result<Option<&'a [u8]>> {
        self.column(index)?;
        Ok(match *self {
            RowView::Text(TextRow { values, .. }) => values[index].as_deref(),
            RowView::Bound(BoundRow { buffers, .. }) => buffers[index].as_bytes(),
        })
    }

    pub fn is_null(&self, index: usize) -> Result<bool> {
        Ok(self.raw(index)?.is_none())
    }

    /// Decode a column by index.
    pub fn get(&self, index: usize) -> Result<Value> {
        let column = self.column(index)?;
        let data = self.raw(index)?;
        match self {
            RowView::Text(_) => decode_text_value(column, data),
            RowView::Bound(_) => decode_bound_value(column, data),
        }
    }

    /// Decode a column by name (case-insensitive).
    pub fn get_by_name(&self, name: &str) -> Result<Value> {
        let index = self
            .metadata()
            .find_by_name(name)
            .ok_or_else(|| Error::ColumnNotFound {
                name: name.to_string(),
            })?;
        self.get(index)
    }

    /// Raw bytes of a column that must not be NULL.
    pub fn bytes(&self, index: usize) -> Result<&'a [u8]> {
        let column = self.column(index)?;
        self.raw(index)?.ok_or_else(|| Error::NullValue {
            column: column.name.clone(),
        })
    }

    /// Decode a non-NULL integer column.
    pub fn get_i64(&self, index: usize) -> Result<i64> {
        let column = self.column(index)?;
        match self.get(index)? {
            Value::Null => Err(Error::NullValue {
                column: column.name.clone(),
            }),
            value => value.to_i64().ok_or_else(|| {
                Error::type_conversion(format!("column {} is not an integer", column.name))
            }),
        }
    }

    /// Decode every column into an owned row.
    pub fn to_row(&self) -> Result<Row> {
        let values = (0..self.len())
            .map(|i| self.get(i))
            .collect::<Result<Vec<_>>>()?;
        Ok(Row::new(values, Arc::clone(self.shared_metadata())))
    }
}

/// A decoded row of query results.
#[derive(Debug, Clone)]
pub struct Row {
    /// Column values.
    values: Vec<Value>,
    /// Shared column metadata (reference counted).
    metadata: Arc<ResultMetadata>,
}

impl Row {
    /// Create a new row with values and shared metadata.
    pub fn new(values: Vec<Value>, metadata: Arc<ResultMetadata>) -> Self {
        Self { values, metadata }
    }

    /// Get value by column index (0-based).
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get value by column name (case-insensitive).
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.metadata
            .find_by_name(name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get all values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Get column metadata.
    pub fn columns(&self) -> &[ColumnMetadata] {
        &self.metadata.columns
    }

    /// Get column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.metadata.column_names()
    }

    /// Iterate over values.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }
}

impl IntoIterator for Row {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
