use crate::config::{DEFAULT_HEADER_INTERVAL, DEFAULT_TIME_WINDOW_NANOS};
use crate::parser::LogRecord;
use crate::time::Timestamp;
use serde::Serialize;
use std::sync::Arc;

pub type Cells = Vec<Option<Arc<LogRecord>>>;

/// One table row: at most one record per node column
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    pub index: usize,
    /// The presentation layer repeats the column header before this row
    pub header: bool,
    pub cells: Cells,
}

impl DisplayRow {
    fn new(index: usize, header_interval: usize, cells: Cells) -> Self {
        Self {
            index,
            header: index % header_interval.max(1) == 0,
            cells,
        }
    }

    /// Record with the smallest timestamp in the row
    pub fn earliest(&self) -> Option<&Arc<LogRecord>> {
        self.cells.iter().flatten().min_by_key(|r| r.t.nanos())
    }

    /// Row time relative to `first`, e.g. `001.250000s`
    pub fn elapsed_since(&self, first: &Timestamp) -> Option<String> {
        self.earliest().map(|r| r.t.elapsed(first))
    }

    pub fn filled(&self) -> usize {
        self.cells.iter().flatten().count()
    }

    pub fn cell(&self, column: usize) -> Option<&Arc<LogRecord>> {
        self.cells.get(column).and_then(|c| c.as_ref())
    }
}

/// The row currently accepting records
struct OpenRow {
    cells: Cells,
    last_nanos: Option<i128>,
}

impl OpenRow {
    fn new(width: usize) -> Self {
        Self {
            cells: vec![None; width],
            last_nanos: None,
        }
    }

    fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Place `record` in `column`. If the column is taken, or the record is
    /// more than `window` after the last placed one, the current cells are
    /// returned and the record starts a fresh row.
    fn place(&mut self, column: usize, record: Arc<LogRecord>, window: i64) -> Option<Cells> {
        let nanos = record.t.nanos();
        let collides = self.cells[column].is_some();
        let too_late = self.last_nanos.is_some_and(|last| nanos - last > i128::from(window));

        let closed = if collides || too_late {
            let width = self.cells.len();
            Some(std::mem::replace(&mut self.cells, vec![None; width]))
        } else {
            None
        };

        self.cells[column] = Some(record);
        self.last_nanos = Some(nanos);
        closed
    }

    fn take(&mut self) -> Option<Cells> {
        if self.is_empty() {
            return None;
        }
        let width = self.cells.len();
        self.last_nanos = None;
        Some(std::mem::replace(&mut self.cells, vec![None; width]))
    }
}

fn column_of(nodes: &[String], record: &LogRecord) -> Option<usize> {
    let column = record
        .node
        .as_deref()
        .and_then(|node| nodes.iter().position(|n| n == node));
    if column.is_none() {
        log::warn!("record {} has unknown node {:?}, skipped", record.id, record.node);
    }
    column
}

/// Incremental grouper that keeps every row it has closed.
///
/// Feeding it more records later continues the open row instead of
/// recomputing what was already grouped.
pub struct RowGrouper {
    nodes: Vec<String>,
    time_window_nanos: i64,
    header_interval: usize,
    closed: Vec<DisplayRow>,
    open: OpenRow,
    consumed: usize,
}

impl RowGrouper {
    pub fn new(nodes: &[String], time_window_nanos: i64, header_interval: usize) -> Self {
        Self {
            nodes: nodes.to_vec(),
            time_window_nanos,
            header_interval: header_interval.max(1),
            closed: Vec::new(),
            open: OpenRow::new(nodes.len()),
            consumed: 0,
        }
    }

    /// Add one record; returns the row it closed, if any
    pub fn push(&mut self, record: Arc<LogRecord>) -> Option<&DisplayRow> {
        self.consumed += 1;
        let column = column_of(&self.nodes, &record)?;
        let cells = self.open.place(column, record, self.time_window_nanos)?;
        let row = DisplayRow::new(self.closed.len(), self.header_interval, cells);
        self.closed.push(row);
        self.closed.last()
    }

    /// Add records in order; returns how many rows were closed
    pub fn extend<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = Arc<LogRecord>>,
    {
        let before = self.closed.len();
        for record in records {
            self.push(record);
        }
        self.closed.len() - before
    }

    pub fn closed_rows(&self) -> &[DisplayRow] {
        &self.closed
    }

    /// The row still accepting records, without closing it
    pub fn open_row(&self) -> Option<DisplayRow> {
        if self.open.is_empty() {
            return None;
        }
        Some(DisplayRow::new(self.closed.len(), self.header_interval, self.open.cells.clone()))
    }

    /// Closed rows followed by the open row
    pub fn snapshot(&self) -> Vec<DisplayRow> {
        let mut rows = self.closed.clone();
        rows.extend(self.open_row());
        rows
    }

    /// Close the open row and return every row
    pub fn finish(mut self) -> Vec<DisplayRow> {
        if let Some(cells) = self.open.take() {
            let row = DisplayRow::new(self.closed.len(), self.header_interval, cells);
            self.closed.push(row);
        }
        self.closed
    }

    /// Records fed so far, including skipped ones
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }
}

/// Lazily group time-ordered records into display rows.
///
/// `nodes` fixes the column order; a record joins the open row unless its
/// node's column is already filled or it comes more than
/// `time_window_nanos` after the last record placed.
pub fn group_for_display<I>(records: I, nodes: &[String], time_window_nanos: i64) -> GroupRows<'_, I::IntoIter>
where
    I: IntoIterator<Item = Arc<LogRecord>>,
{
    GroupRows {
        records: records.into_iter(),
        nodes,
        time_window_nanos,
        header_interval: DEFAULT_HEADER_INTERVAL,
        open: OpenRow::new(nodes.len()),
        emitted: 0,
        done: false,
    }
}

/// Iterator returned by [`group_for_display`]
pub struct GroupRows<'n, I> {
    records: I,
    nodes: &'n [String],
    time_window_nanos: i64,
    header_interval: usize,
    open: OpenRow,
    emitted: usize,
    done: bool,
}

impl<'n, I> GroupRows<'n, I> {
    pub fn header_interval(mut self, interval: usize) -> Self {
        self.header_interval = interval.max(1);
        self
    }

    fn emit(&mut self, cells: Cells) -> DisplayRow {
        let row = DisplayRow::new(self.emitted, self.header_interval, cells);
        self.emitted += 1;
        row
    }
}

impl<'n, I> Iterator for GroupRows<'n, I>
where
    I: Iterator<Item = Arc<LogRecord>>,
{
    type Item = DisplayRow;

    fn next(&mut self) -> Option<DisplayRow> {
        if self.done {
            return None;
        }
        while let Some(record) = self.records.next() {
            let Some(column) = column_of(self.nodes, &record) else {
                continue;
            };
            if let Some(cells) = self.open.place(column, record, self.time_window_nanos) {
                return Some(self.emit(cells));
            }
        }
        self.done = true;
        let cells = self.open.take()?;
        Some(self.emit(cells))
    }
}

impl Default for RowGrouper {
    fn default() -> Self {
        Self::new(&[], DEFAULT_TIME_WINDOW_NANOS, DEFAULT_HEADER_INTERVAL)
    }
}
