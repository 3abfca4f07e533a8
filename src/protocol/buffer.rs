//! Output buffers for prepared-statement rows.
//!
//! Each result column owns one `ColumnBuffer`. Fixed-width columns are
//! allocated once at their type's size. Variable-width columns start empty
//! and grow to the exact length the engine reports when a value does not fit;
//! they are reused across rows and executions and never shrink.

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::protocol::engine::StatementHandle;
use crate::protocol::types::{
    build_output_bindings, BufferSize, OutputBinding, ResultMetadata,
};

fn allocate(len: usize) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| Error::Allocation { requested: len })?;
    data.resize(len, 0);
    Ok(data)
}

/// Output buffer for one result column.
#[derive(Debug, Clone)]
pub struct ColumnBuffer {
    /// Backing storage; its length is the buffer capacity.
    data: Vec<u8>,
    size: BufferSize,
    /// Length the engine reported for the current value.
    length: usize,
    is_null: bool,
    /// Bytes currently exposed to the engine.
    bound: usize,
}

impl ColumnBuffer {
    /// Allocate a buffer for a column of the given size class.
    pub fn new(size: BufferSize) -> Result<Self> {
        let data = allocate(size.bytes())?;
        let bound = data.len();
        Ok(Self {
            data,
            size,
            length: 0,
            is_null: false,
            bound,
        })
    }

    /// Allocated bytes.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Reported length of the current value.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn is_null(&self) -> bool {
        self.is_null
    }

    pub fn is_fixed(&self) -> bool {
        !self.size.is_variable()
    }

    /// Whether the current value was only partially written.
    pub fn is_truncated(&self) -> bool {
        !self.is_fixed() && !self.is_null && self.length > self.bound
    }

    /// Current value, or `None` for NULL.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        if self.is_null {
            return None;
        }
        let end = self.length.min(self.capacity());
        Some(&self.data[..end])
    }

    /// Bytes the engine may write for the current fetch.
    pub fn bound_len(&self) -> usize {
        self.bound
    }

    /// Writable region exposed to the engine.
    pub fn bound_mut(&mut self) -> &mut [u8] {
        &mut self.data[..self.bound]
    }

    /// Record the value length the engine reported.
    pub fn set_length(&mut self, length: usize) {
        self.length = length;
    }

    pub fn set_null(&mut self, is_null: bool) {
        self.is_null = is_null;
    }

    /// Zero the per-execution state. Capacity is kept.
    pub(crate) fn reset(&mut self) {
        self.length = 0;
        self.is_null = false;
        self.bound = match self.size {
            BufferSize::Fixed(_) => self.capacity(),
            BufferSize::Variable => 0,
        };
    }

    /// Make room for at least `needed` bytes. Returns whether the buffer
    /// was reallocated.
    pub(crate) fn ensure_capacity(&mut self, needed: usize) -> Result<bool> {
        if needed <= self.capacity() {
            return Ok(false);
        }
        self.data = allocate(needed)?;
        Ok(true)
    }

    /// Expose the whole reported length for a column re-read.
    fn prepare_refetch(&mut self) -> Result<bool> {
        let grew = self.ensure_capacity(self.length)?;
        self.bound = self.length;
        Ok(grew)
    }

    /// Expose the full capacity for subsequent rows.
    fn finish_refetch(&mut self) {
        self.bound = self.capacity();
    }
}

/// Per-statement set of column output buffers.
///
/// Buffers are allocated on first use and reused by every later execution of
/// the same statement.
#[derive(Debug, Default)]
pub struct RowBufferCache {
    buffers: Vec<ColumnBuffer>,
    allocated: bool,
}

impl RowBufferCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    /// Get the number of column buffers.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Allocate buffers for `metadata` on first use, otherwise reset the
    /// existing ones for a new execution.
    pub fn prepare(&mut self, metadata: &ResultMetadata) -> Result<()> {
        if !self.allocated {
            self.buffers = metadata
                .iter()
                .map(|col| ColumnBuffer::new(col.buffer_size()))
                .collect::<Result<Vec<_>>>()?;
            self.allocated = true;
            debug!(columns = self.buffers.len(), "allocated column buffers");
            return Ok(());
        }

        if self.buffers.len() != metadata.len() {
            return Err(Error::invalid_state(format!(
                "buffer cache holds {} columns, result has {}",
                self.buffers.len(),
                metadata.len()
            )));
        }
        for buf in &mut self.buffers {
            buf.reset();
        }
        Ok(())
    }

    /// Output bindings reflecting the current buffers.
    pub fn output_bindings(&self, metadata: &ResultMetadata) -> Vec<OutputBinding> {
        build_output_bindings(metadata, &self.buffers)
    }

    pub fn buffers(&self) -> &[ColumnBuffer] {
        &self.buffers
    }

    pub fn buffers_mut(&mut self) -> &mut [ColumnBuffer] {
        &mut self.buffers
    }

    /// Capacity of one column's buffer.
    pub fn capacity(&self, index: usize) -> Option<usize> {
        self.buffers.get(index).map(ColumnBuffer::capacity)
    }

    /// Re-read every truncated column of the current row, growing buffers
    /// as needed. Returns the number of columns re-read.
    pub fn refetch_truncated<S: StatementHandle>(&mut self, handle: &mut S) -> Result<usize> {
        let mut refetched = 0;
        for (index, buf) in self.buffers.iter_mut().enumerate() {
            if !buf.is_truncated() {
                continue;
            }
            let before = buf.capacity();
            if buf.prepare_refetch()? {
                trace!(column = index, from = before, to = buf.capacity(), "grew column buffer");
            }
            let fetched = handle.fetch_column(index, buf);
            buf.finish_refetch();
            fetched.map_err(Error::fetch)?;
            refetched += 1;
        }
        Ok(refetched)
    }

    /// Drop every buffer. Returns the number released, 0 if already released.
    pub fn release(&mut self) -> usize {
        let released = self.buffers.len();
        self.buffers = Vec::new();
        self.allocated = false;
        released
    }
}
