//! Command-channel state shared by a connection and its statements.
//!
//! The engine serves one command at a time. A `Connection` and every
//! `Statement` it prepared hold the same `Session`, so a statement can see
//! that the connection was closed or still has query results unread, and
//! the connection can see that a statement is streaming rows.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::error::{Error, Result};

const NO_STREAM: u64 = 0;

#[derive(Debug, Default)]
pub(crate) struct Session {
    closed: AtomicBool,
    /// A direct query was sent and its results are not yet drained.
    result_pending: AtomicBool,
    /// Id of the statement streaming rows, `NO_STREAM` if none.
    streaming: AtomicU64,
    last_statement_id: AtomicU64,
}

impl Session {
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Mark the connection closed. Returns `false` if it already was.
    pub(crate) fn mark_closed(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn set_result_pending(&self) {
        self.result_pending.store(true, Ordering::Release);
    }

    /// Clear the pending flag, returning whether it was set.
    pub(crate) fn take_result_pending(&self) -> bool {
        self.result_pending.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn register_statement(&self) -> u64 {
        self.last_statement_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn begin_stream(&self, statement: u64) {
        self.streaming.store(statement, Ordering::Release);
    }

    /// Release the channel if `statement` holds it.
    pub(crate) fn end_stream(&self, statement: u64) {
        let _ = self.streaming.compare_exchange(
            statement,
            NO_STREAM,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Refuse a direct command while a statement is streaming rows.
    pub(crate) fn check_connection_command(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::ConnectionClosed);
        }
        let holder = self.streaming.load(Ordering::Acquire);
        if holder != NO_STREAM {
            return Err(Error::invalid_state(format!(
                "statement {holder} is still streaming rows"
            )));
        }
        Ok(())
    }

    /// Refuse a statement execution while the channel belongs to someone
    /// else. A statement may always re-execute over its own stream.
    pub(crate) fn check_statement_command(&self, statement: u64) -> Result<()> {
        if self.is_closed() {
            return Err(Error::ConnectionClosed);
        }
        if self.result_pending.load(Ordering::Acquire) {
            return Err(Error::invalid_state(
                "connection has unread query results",
            ));
        }
        let holder = self.streaming.load(Ordering::Acquire);
        if holder != NO_STREAM && holder != statement {
            return Err(Error::invalid_state(format!(
                "statement {holder} is still streaming rows"
            )));
        }
        Ok(())
    }
}
