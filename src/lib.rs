use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

pub mod config;
pub mod error;
pub mod grid;
pub mod parser;
pub mod query;
pub mod time;
pub mod types;

pub use config::ViewerConfig;
pub use error::{Result, ViewerError};
pub use grid::{group_for_display, DisplayRow, RowGrouper};
pub use parser::{LogCorpus, LogRecord};
pub use query::{FilterPage, FilterState};
pub use time::Timestamp;
pub use types::{ImportSummary, LogFilters};

/// Result of one "load more"
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResp {
    pub appended: usize,
    pub total_loaded: usize,
    pub next_offset: usize,
    pub exhausted: bool,
    pub rows: usize,
}

/// One viewing session over one imported corpus.
///
/// Holds the corpus, the filter cursor, the records loaded so far and the
/// grouped rows, and replaces all of them on every import.
pub struct LogViewer {
    config: ViewerConfig,
    corpus: LogCorpus,
    filter: FilterState,
    loaded: Vec<Arc<LogRecord>>,
    grouper: RowGrouper,
}

impl Default for LogViewer {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl LogViewer {
    pub fn new(config: ViewerConfig) -> Self {
        let grouper = RowGrouper::new(&[], config.time_window_nanos, config.header_interval);
        let filter = FilterState::new(&LogFilters::default(), config.case_insensitive).unwrap_or_default();
        Self {
            config,
            corpus: LogCorpus::default(),
            filter,
            loaded: Vec::new(),
            grouper,
        }
    }

    pub fn import_text(&mut self, text: &str) -> ImportSummary {
        self.replace_corpus(LogCorpus::load(text))
    }

    pub fn import_bytes(&mut self, bytes: &[u8]) -> Result<ImportSummary> {
        let corpus = LogCorpus::load_bytes(bytes)?;
        Ok(self.replace_corpus(corpus))
    }

    /// Read and concatenate log files (plain or zip) and import them as one corpus
    pub fn import_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<ImportSummary> {
        if paths.is_empty() {
            return Err(ViewerError::NoSources);
        }
        let bytes = parser::read_sources(paths)?;
        self.import_bytes(&bytes)
    }

    pub fn import_sample(&mut self) -> ImportSummary {
        self.import_text(parser::SAMPLE_LOG)
    }

    fn replace_corpus(&mut self, corpus: LogCorpus) -> ImportSummary {
        self.corpus = corpus;
        self.filter = FilterState::new(&LogFilters::default(), self.config.case_insensitive).unwrap_or_default();
        self.restart();
        let summary = self.corpus.summary();
        log::info!("logs imported: {} records found", summary.records);
        summary
    }

    /// Apply new filters and reload from the start.
    ///
    /// A message pattern that does not compile is reported as an error, but
    /// the view is still reloaded with the level filter alone.
    pub fn apply_filters(&mut self, filters: &LogFilters) -> Result<LoadResp> {
        let applied = self.filter.set_filters(filters);
        self.restart();
        let resp = self.last_load();
        log::info!("logs filtered: {} records found", resp.total_loaded);
        applied.map(|_| resp)
    }

    /// Fetch the next page of matching records and group them
    pub fn load_more(&mut self) -> LoadResp {
        let page = self.filter.page(&self.corpus, self.config.page_size);
        self.grouper.extend(page.records.iter().cloned());
        let appended = page.len();
        self.loaded.extend(page.records);

        LoadResp {
            appended,
            total_loaded: self.loaded.len(),
            next_offset: page.next_offset,
            exhausted: page.exhausted,
            rows: self.grouper.closed_rows().len() + usize::from(self.grouper.open_row().is_some()),
        }
    }

    fn restart(&mut self) {
        self.filter.reset();
        self.loaded.clear();
        self.grouper = RowGrouper::new(
            self.corpus.nodes(),
            self.config.time_window_nanos,
            self.config.header_interval,
        );
        self.load_more();
    }

    fn last_load(&self) -> LoadResp {
        LoadResp {
            appended: self.loaded.len(),
            total_loaded: self.loaded.len(),
            next_offset: self.filter.offset(),
            exhausted: self.filter.offset() >= self.corpus.len(),
            rows: self.grouper.closed_rows().len() + usize::from(self.grouper.open_row().is_some()),
        }
    }

    /// Current display rows, the last one possibly still open
    pub fn rows(&self) -> Vec<DisplayRow> {
        self.grouper.snapshot()
    }

    /// Row time relative to the first record of the corpus
    pub fn row_elapsed(&self, row: &DisplayRow) -> Option<String> {
        let first = self.corpus.first()?;
        row.elapsed_since(&first.t)
    }

    pub fn records(&self) -> &[Arc<LogRecord>] {
        &self.loaded
    }

    pub fn corpus(&self) -> &LogCorpus {
        &self.corpus
    }

    pub fn filters(&self) -> &LogFilters {
        self.filter.filters()
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }
}
