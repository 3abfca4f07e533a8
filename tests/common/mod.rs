//! In-memory engine used by the integration tests.
//!
//! `MockEngine` behaves like a blocking client library with one command
//! channel: sending a query or preparing a statement while a result set (or a
//! trailing one) is still unread fails with "Commands out of sync" (2014).
//! Every engine call is counted in a shared `Stats` so tests can assert what
//! the layer above did.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use mysql_rowbind::protocol::constants::{CR_COMMANDS_OUT_OF_SYNC, CR_UNKNOWN_ERROR};
use mysql_rowbind::{
    ColumnBuffer, ColumnMetadata, ConnectParams, DatabaseEngine, EngineError, EngineResult,
    FetchMode, FetchStatus, OutputBinding, ParamValue, RawRow, ServerType, StatementHandle,
};

/// Counters for every engine call.
#[derive(Debug, Default)]
pub struct Stats {
    pub queries: Vec<String>,
    pub open_modes: Vec<FetchMode>,
    pub raw_fetches: usize,
    pub free_results: usize,
    pub discarded_sets: usize,
    pub engine_closes: usize,
    pub prepares: usize,
    pub describes: usize,
    pub true_length_requests: usize,
    pub executes: usize,
    pub stores: usize,
    pub bound_fetches: usize,
    pub column_refetches: Vec<usize>,
    pub stmt_free_results: usize,
    pub stmt_closes: usize,
    pub output_bindings: Vec<Vec<OutputBinding>>,
    pub bound_inputs: Vec<Vec<ParamValue>>,
}

#[derive(Debug, Clone, Default)]
pub struct SharedStats(Arc<Mutex<Stats>>);

impl SharedStats {
    pub fn get(&self) -> MutexGuard<'_, Stats> {
        self.0.lock().unwrap()
    }
}

/// One scripted result set of a direct query.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub columns: Vec<ColumnMetadata>,
    pub rows: VecDeque<RawRow>,
    pub affected_rows: u64,
    pub insert_id: u64,
    /// Fail the fetch after this many rows.
    pub fail_after: Option<usize>,
    /// Fail when this set is reached while draining.
    pub discard_error: Option<EngineError>,
}

impl ResultSet {
    pub fn rows(columns: Vec<ColumnMetadata>, rows: &[&[Option<&str>]]) -> Self {
        let rows: VecDeque<RawRow> = rows
            .iter()
            .map(|r| {
                RawRow::new(
                    r.iter()
                        .map(|c| c.map(|s| Bytes::copy_from_slice(s.as_bytes())))
                        .collect(),
                )
            })
            .collect();
        let affected_rows = rows.len() as u64;
        Self {
            columns,
            rows,
            affected_rows,
            ..Self::default()
        }
    }

    pub fn mutation(affected_rows: u64, insert_id: u64) -> Self {
        Self {
            affected_rows,
            insert_id,
            ..Self::default()
        }
    }

    pub fn failing_after(mut self, rows: usize) -> Self {
        self.fail_after = Some(rows);
        self
    }

    pub fn failing_discard(mut self, code: u32, message: &str) -> Self {
        self.discard_error = Some(EngineError::new(code, message));
        self
    }
}

/// Native cell encoding for bound rows.
pub type Cell = Option<Vec<u8>>;

pub fn text(s: &str) -> Cell {
    Some(s.as_bytes().to_vec())
}

pub fn int64(v: i64) -> Cell {
    Some(v.to_ne_bytes().to_vec())
}

/// Script for one prepared statement.
#[derive(Debug, Clone, Default)]
pub struct StatementScript {
    pub param_count: usize,
    pub columns: Vec<ColumnMetadata>,
    /// Rows keyed by the first bound integer parameter (0 when unbound).
    pub results: HashMap<i64, Vec<Vec<Cell>>>,
    pub affected_rows: u64,
    pub insert_id: u64,
    pub execute_error: Option<EngineError>,
    /// Fail the bound fetch after this many rows.
    pub fail_after: Option<usize>,
    /// Fail the next column re-read.
    pub column_error: Option<EngineError>,
    /// Report an unallocatable length for this column on the next row.
    pub oversized_column: Option<usize>,
}

impl StatementScript {
    pub fn select(param_count: usize, columns: Vec<ColumnMetadata>) -> Self {
        Self {
            param_count,
            columns,
            ..Self::default()
        }
    }

    pub fn mutation(param_count: usize, affected_rows: u64, insert_id: u64) -> Self {
        Self {
            param_count,
            affected_rows,
            insert_id,
            ..Self::default()
        }
    }

    pub fn with_rows(mut self, key: i64, rows: Vec<Vec<Cell>>) -> Self {
        self.results.insert(key, rows);
        self
    }

    pub fn failing_after(mut self, rows: usize) -> Self {
        self.fail_after = Some(rows);
        self
    }

    pub fn failing_column_reread(mut self, code: u32, message: &str) -> Self {
        self.column_error = Some(EngineError::new(code, message));
        self
    }

    pub fn oversized_once(mut self, column: usize) -> Self {
        self.oversized_column = Some(column);
        self
    }
}

pub struct MockEngine {
    queries: HashMap<String, Vec<ResultSet>>,
    statements: HashMap<String, StatementScript>,
    current: Option<ResultSet>,
    trailing: VecDeque<ResultSet>,
    fetched_in_set: usize,
    affected_rows: u64,
    insert_id: u64,
    last_error: Option<EngineError>,
    stats: SharedStats,
}

impl MockEngine {
    pub fn new(stats: SharedStats) -> Self {
        Self {
            queries: HashMap::new(),
            statements: HashMap::new(),
            current: None,
            trailing: VecDeque::new(),
            fetched_in_set: 0,
            affected_rows: 0,
            insert_id: 0,
            last_error: None,
            stats,
        }
    }

    /// Script a query producing a chain of result sets.
    pub fn with_query(mut self, sql: &str, sets: Vec<ResultSet>) -> Self {
        self.queries.insert(sql.to_string(), sets);
        self
    }

    pub fn with_statement(mut self, sql: &str, script: StatementScript) -> Self {
        self.statements.insert(sql.to_string(), script);
        self
    }

    /// Whether a result set is still unread on the channel.
    pub fn out_of_sync(&self) -> bool {
        self.current.is_some() || !self.trailing.is_empty()
    }

    fn fail<T>(&mut self, code: u32, message: &str) -> EngineResult<T> {
        let err = EngineError::new(code, message);
        self.last_error = Some(err.clone());
        Err(err)
    }

    fn check_sync(&mut self) -> EngineResult<()> {
        if self.out_of_sync() {
            return self.fail(
                CR_COMMANDS_OUT_OF_SYNC,
                "Commands out of sync; you can't run this command now",
            );
        }
        Ok(())
    }
}

impl DatabaseEngine for MockEngine {
    type Statement = MockStatement;

    fn connect(params: &ConnectParams) -> EngineResult<Self> {
        if params.password != "secret" {
            return Err(EngineError::new(
                1045,
                format!("Access denied for user '{}'", params.user),
            ));
        }
        Ok(Self::new(SharedStats::default()))
    }

    fn close(&mut self) {
        self.stats.get().engine_closes += 1;
    }

    fn thread_id(&self) -> u64 {
        42
    }

    fn ping(&mut self) -> EngineResult<()> {
        self.check_sync()
    }

    fn query(&mut self, sql: &str) -> EngineResult<()> {
        self.last_error = None;
        self.check_sync()?;
        self.stats.get().queries.push(sql.to_string());

        let Some(sets) = self.queries.get(sql).cloned() else {
            return self.fail(1064, "You have an error in your SQL syntax");
        };
        let mut sets: VecDeque<ResultSet> = sets.into();
        let first = sets.pop_front().unwrap_or_default();
        self.affected_rows = first.affected_rows;
        self.insert_id = first.insert_id;
        self.current = Some(first);
        self.trailing = sets;
        self.fetched_in_set = 0;
        Ok(())
    }

    fn open_result(&mut self, mode: FetchMode) -> EngineResult<Option<Vec<ColumnMetadata>>> {
        self.stats.get().open_modes.push(mode);
        let columns = self
            .current
            .as_ref()
            .map(|set| set.columns.clone())
            .unwrap_or_default();
        if columns.is_empty() {
            // No result set object for statements without columns.
            self.current = None;
            return Ok(None);
        }
        Ok(Some(columns))
    }

    fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    fn insert_id(&self) -> u64 {
        self.insert_id
    }

    fn fetch_raw_row(&mut self) -> Option<RawRow> {
        self.last_error = None;
        self.stats.get().raw_fetches += 1;
        let set = self.current.as_mut()?;
        if set.fail_after == Some(self.fetched_in_set) {
            self.last_error = Some(EngineError::new(2013, "Lost connection to MySQL server"));
            return None;
        }
        let row = set.rows.pop_front()?;
        self.fetched_in_set += 1;
        Some(row)
    }

    fn free_result(&mut self) {
        self.stats.get().free_results += 1;
        self.current = None;
    }

    fn has_more_result_sets(&self) -> bool {
        !self.trailing.is_empty()
    }

    fn discard_result_set(&mut self) -> EngineResult<()> {
        let Some(set) = self.trailing.pop_front() else {
            return self.fail(CR_UNKNOWN_ERROR, "no more results");
        };
        if let Some(err) = set.discard_error {
            self.trailing.clear();
            self.last_error = Some(err.clone());
            return Err(err);
        }
        self.stats.get().discarded_sets += 1;
        Ok(())
    }

    fn prepare(&mut self, sql: &str) -> EngineResult<MockStatement> {
        self.check_sync()?;
        self.stats.get().prepares += 1;
        match self.statements.get(sql) {
            Some(script) => Ok(MockStatement::new(script.clone(), self.stats.clone())),
            None => self.fail(1146, "Table 'test.missing' doesn't exist"),
        }
    }

    fn last_error_code(&self) -> u32 {
        self.last_error.as_ref().map_or(0, |e| e.code)
    }

    fn last_error_message(&self) -> String {
        self.last_error
            .as_ref()
            .map(|e| e.message.clone())
            .unwrap_or_default()
    }
}

pub struct MockStatement {
    script: StatementScript,
    params: Vec<ParamValue>,
    rows: VecDeque<Vec<Cell>>,
    current_row: Option<Vec<Cell>>,
    fetched: usize,
    last_error: Option<EngineError>,
    stats: SharedStats,
}

impl MockStatement {
    fn new(script: StatementScript, stats: SharedStats) -> Self {
        Self {
            script,
            params: Vec::new(),
            rows: VecDeque::new(),
            current_row: None,
            fetched: 0,
            last_error: None,
            stats,
        }
    }

    fn key(&self) -> i64 {
        match self.params.first() {
            Some(ParamValue::LongLong(v)) => *v,
            Some(ParamValue::Long(v)) => *v as i64,
            Some(ParamValue::Short(v)) => *v as i64,
            Some(ParamValue::Tiny(v)) => *v as i64,
            _ => 0,
        }
    }
}

impl StatementHandle for MockStatement {
    fn param_count(&self) -> usize {
        self.script.param_count
    }

    fn bind_inputs(&mut self, params: &[ParamValue]) -> EngineResult<()> {
        self.stats.get().bound_inputs.push(params.to_vec());
        self.params = params.to_vec();
        Ok(())
    }

    fn describe_output_columns(&mut self) -> EngineResult<Vec<ColumnMetadata>> {
        self.stats.get().describes += 1;
        Ok(self.script.columns.clone())
    }

    fn report_true_lengths(&mut self) -> EngineResult<()> {
        self.stats.get().true_length_requests += 1;
        Ok(())
    }

    fn execute(&mut self) -> EngineResult<()> {
        self.last_error = None;
        self.stats.get().executes += 1;
        if let Some(err) = self.script.execute_error.clone() {
            self.last_error = Some(err.clone());
            return Err(err);
        }
        self.rows = self
            .script
            .results
            .get(&self.key())
            .cloned()
            .unwrap_or_default()
            .into();
        self.current_row = None;
        self.fetched = 0;
        Ok(())
    }

    fn store_result(&mut self) -> EngineResult<()> {
        self.stats.get().stores += 1;
        Ok(())
    }

    fn bind_outputs(&mut self, bindings: &[OutputBinding]) -> EngineResult<()> {
        self.stats.get().output_bindings.push(bindings.to_vec());
        Ok(())
    }

    fn affected_rows(&self) -> u64 {
        if self.script.columns.is_empty() {
            self.script.affected_rows
        } else {
            self.rows.len() as u64
        }
    }

    fn insert_id(&self) -> u64 {
        self.script.insert_id
    }

    fn fetch_bound(&mut self, outputs: &mut [ColumnBuffer]) -> FetchStatus {
        self.stats.get().bound_fetches += 1;
        if self.script.fail_after == Some(self.fetched) {
            self.last_error = Some(EngineError::new(2013, "Lost connection to MySQL server"));
            return FetchStatus::Error;
        }
        let Some(row) = self.rows.pop_front() else {
            self.current_row = None;
            return FetchStatus::NoData;
        };
        self.fetched += 1;

        let oversized = self.script.oversized_column.take();
        let mut truncated = false;
        for (index, (cell, out)) in row.iter().zip(outputs.iter_mut()).enumerate() {
            if oversized == Some(index) {
                out.set_null(false);
                out.set_length(usize::MAX);
                truncated = true;
                continue;
            }
            match cell {
                None => {
                    out.set_null(true);
                    out.set_length(0);
                }
                Some(value) => {
                    out.set_null(false);
                    out.set_length(value.len());
                    let dst = out.bound_mut();
                    let n = dst.len().min(value.len());
                    dst[..n].copy_from_slice(&value[..n]);
                    truncated |= value.len() > n;
                }
            }
        }
        self.current_row = Some(row);
        if truncated {
            FetchStatus::Truncated
        } else {
            FetchStatus::Row
        }
    }

    fn fetch_column(&mut self, index: usize, output: &mut ColumnBuffer) -> EngineResult<()> {
        self.stats.get().column_refetches.push(index);
        if let Some(err) = self.script.column_error.take() {
            self.last_error = Some(err.clone());
            return Err(err);
        }
        let value = self
            .current_row
            .as_ref()
            .and_then(|row| row.get(index).cloned())
            .flatten()
            .unwrap_or_default();
        let dst = output.bound_mut();
        if dst.len() < value.len() {
            return Err(EngineError::new(CR_UNKNOWN_ERROR, "column buffer too small"));
        }
        dst[..value.len()].copy_from_slice(&value);
        Ok(())
    }

    fn free_result(&mut self) {
        self.stats.get().stmt_free_results += 1;
        self.rows.clear();
        self.current_row = None;
    }

    fn close(&mut self) -> EngineResult<()> {
        self.stats.get().stmt_closes += 1;
        Ok(())
    }

    fn last_error_code(&self) -> u32 {
        self.last_error.as_ref().map_or(0, |e| e.code)
    }

    fn last_error_message(&self) -> String {
        self.last_error
            .as_ref()
            .map(|e| e.message.clone())
            .unwrap_or_default()
    }
}

pub fn column(name: &str, server_type: ServerType) -> ColumnMetadata {
    ColumnMetadata::new(name, server_type)
}
