use crate::error::Result;
use crate::parser::{LogCorpus, LogRecord};
use crate::query::cursor::FilterPage;
use crate::query::filter::MessagePattern;
use crate::types::LogFilters;
use std::collections::HashSet;
use std::sync::Arc;

/// Filter configuration plus a cursor into a corpus's sorted records.
///
/// The cursor only moves forward while scanning; changing the filters or
/// calling [`FilterState::reset`] puts it back at 0.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    filters: LogFilters,
    levels: HashSet<String>,
    message: Option<MessagePattern>,
    case_insensitive: bool,
    offset: usize,
}

impl FilterState {
    /// Build a state from `filters`. Empty filters pass every record.
    pub fn new(filters: &LogFilters, case_insensitive: bool) -> Result<Self> {
        let mut state = Self {
            case_insensitive,
            ..Default::default()
        };
        state.set_filters(filters)?;
        Ok(state)
    }

    /// Replace the level set and message pattern and rewind the cursor.
    ///
    /// On a pattern that does not compile the level set is still applied,
    /// the message predicate is left unset and the error is returned.
    pub fn set_filters(&mut self, filters: &LogFilters) -> Result<()> {
        self.filters = filters.clone();
        self.levels = filters
            .levels
            .iter()
            .flatten()
            .cloned()
            .collect();
        self.offset = 0;

        let spec = filters.message.as_deref().unwrap_or("");
        match MessagePattern::compile(spec, self.case_insensitive) {
            Ok(pattern) => {
                self.message = pattern;
                Ok(())
            }
            Err(e) => {
                log::error!("invalid message filter {:?}: {}", spec, e);
                self.message = None;
                self.filters.message = None;
                Err(e)
            }
        }
    }

    /// Rewind the cursor, keeping the configured predicates
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Number of corpus records examined so far
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Filters currently in effect (an uncompilable message is dropped)
    pub fn filters(&self) -> &LogFilters {
        &self.filters
    }

    pub fn matches(&self, record: &LogRecord) -> bool {
        if !self.levels.is_empty() && !self.levels.contains(&record.level) {
            return false;
        }
        match &self.message {
            Some(pattern) => pattern.is_match(&record.body),
            None => true,
        }
    }

    /// Lazily yield up to `limit` matching records, starting at the cursor.
    ///
    /// Every record the scan looks at advances the cursor, matching or not,
    /// so the next call resumes right after the last record examined. A
    /// consumer that stops pulling early leaves the cursor there.
    pub fn filter<'a>(&'a mut self, corpus: &'a LogCorpus, limit: usize) -> FilterScan<'a> {
        FilterScan {
            state: self,
            records: corpus.records(),
            remaining: limit,
        }
    }

    /// Collect the next batch of at most `limit` matches
    pub fn page(&mut self, corpus: &LogCorpus, limit: usize) -> FilterPage {
        let start = self.offset;
        let records: Vec<Arc<LogRecord>> = self.filter(corpus, limit).cloned().collect();
        FilterPage {
            records,
            examined: self.offset - start,
            next_offset: self.offset,
            exhausted: self.offset >= corpus.len(),
        }
    }
}

/// Iterator returned by [`FilterState::filter`]
pub struct FilterScan<'a> {
    state: &'a mut FilterState,
    records: &'a [Arc<LogRecord>],
    remaining: usize,
}

impl<'a> Iterator for FilterScan<'a> {
    type Item = &'a Arc<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let records = self.records;
        while let Some(record) = records.get(self.state.offset) {
            self.state.offset += 1;
            if self.state.matches(record) {
                self.remaining -= 1;
                return Some(record);
            }
        }
        None
    }
}
