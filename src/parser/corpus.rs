use crate::error::{Result, ViewerError};
use crate::parser::record::LogRecord;
use crate::types::ImportSummary;
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

/// What happened to each input line during a load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub lines: usize,
    pub accepted: usize,
    pub malformed: usize,
    pub rejected: usize,
    pub without_node: usize,
}

enum LineOutcome {
    Record(LogRecord),
    Blank,
    Malformed,
    Rejected,
    WithoutNode,
}

/// All records of one import, sorted by time, plus distinct-value indexes.
///
/// Built once by [`LogCorpus::load`] and never mutated; records are shared
/// with the filter and grouper through `Arc`.
#[derive(Debug, Clone, Default)]
pub struct LogCorpus {
    records: Vec<Arc<LogRecord>>,
    nodes: Vec<String>,
    modules: Vec<String>,
    levels: Vec<String>,
    messages: Vec<String>,
    stats: LoadStats,
}

impl LogCorpus {
    /// Build a corpus from newline-delimited JSON.
    ///
    /// Bad lines are logged and skipped, as are records without a node.
    pub fn load(text: &str) -> Self {
        let outcomes: Vec<LineOutcome> = text.par_lines().map(parse_line).collect();

        let mut stats = LoadStats::default();
        let mut records = Vec::new();
        let mut nodes = DistinctValues::default();
        let mut modules = DistinctValues::default();
        let mut levels = DistinctValues::default();
        let mut messages = DistinctValues::default();

        for outcome in outcomes {
            match outcome {
                LineOutcome::Blank => continue,
                LineOutcome::Malformed => stats.malformed += 1,
                LineOutcome::Rejected => stats.rejected += 1,
                LineOutcome::WithoutNode => stats.without_node += 1,
                LineOutcome::Record(record) => {
                    if let Some(node) = &record.node {
                        nodes.insert(node);
                    }
                    modules.insert(&record.module);
                    levels.insert(&record.level);
                    messages.insert(&record.message);
                    records.push(Arc::new(record));
                    stats.accepted += 1;
                }
            }
            stats.lines += 1;
        }

        // stable: equal timestamps keep input order
        records.sort_by_key(|r| r.t.nanos());

        let mut nodes = nodes.into_vec();
        nodes.sort();
        let mut messages = messages.into_vec();
        messages.sort();

        log::debug!(
            "loaded {} records from {} lines ({} malformed, {} rejected, {} without node)",
            stats.accepted,
            stats.lines,
            stats.malformed,
            stats.rejected,
            stats.without_node
        );

        Self {
            records,
            nodes,
            modules: modules.into_vec(),
            levels: levels.into_vec(),
            messages,
            stats,
        }
    }

    /// Load raw file content.
    ///
    /// Fails only when the input as a whole is unusable: not UTF-8 text, or
    /// non-blank content in which no line is a JSON object.
    pub fn load_bytes(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            ViewerError::InvalidInput(format!("log content is not UTF-8 text: {}", e))
        })?;

        let corpus = Self::load(text);
        let s = corpus.stats;
        if s.lines > 0 && s.malformed == s.lines {
            return Err(ViewerError::InvalidInput(format!(
                "none of {} lines is a JSON log record",
                s.lines
            )));
        }
        Ok(corpus)
    }

    pub fn records(&self) -> &[Arc<LogRecord>] {
        &self.records
    }

    /// Sorted distinct nodes; also the column order of the display grid
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Distinct modules in first-seen order
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// Distinct levels in first-seen order
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest record, the reference point for elapsed times
    pub fn first(&self) -> Option<&Arc<LogRecord>> {
        self.records.first()
    }

    pub fn node_index(&self, node: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n == node)
    }

    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            records: self.records.len(),
            nodes: self.nodes.clone(),
            modules: self.modules.clone(),
            levels: self.levels.clone(),
            messages: self.messages.len(),
        }
    }
}

fn parse_line(line: &str) -> LineOutcome {
    if line.trim().is_empty() {
        return LineOutcome::Blank;
    }
    match LogRecord::from_json(line) {
        Ok(Some(record)) if record.node.is_none() => {
            log::debug!("skipping record without node: {}", record.id);
            LineOutcome::WithoutNode
        }
        Ok(Some(record)) => LineOutcome::Record(record),
        Ok(None) => LineOutcome::Malformed,
        Err(e) => {
            log::error!("skipping log line: {}", e);
            LineOutcome::Rejected
        }
    }
}

/// Insertion-ordered set of strings
#[derive(Default)]
struct DistinctValues {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl DistinctValues {
    fn insert(&mut self, value: &str) {
        if !self.seen.contains(value) {
            self.seen.insert(value.to_string());
            self.order.push(value.to_string());
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(node: Option<&str>, module: &str, lvl: &str, msg: &str, t: &str) -> String {
        let mut v = serde_json::json!({
            "module": module,
            "msg": msg,
            "lvl": lvl,
            "t": t,
            "caller": "main.go:1",
        });
        if let Some(n) = node {
            v["node"] = serde_json::json!(n);
        }
        v.to_string()
    }

    #[test]
    fn test_sorted_regardless_of_input_order() {
        let text = [
            line(Some("B"), "m", "info", "third", "2019-05-15T00:00:03Z"),
            line(Some("A"), "m", "info", "first", "2019-05-15T00:00:01Z"),
            line(Some("A"), "m", "info", "second", "2019-05-15T00:00:02Z"),
        ]
        .join("\n");

        let corpus = LogCorpus::load(&text);
        let msgs: Vec<&str> = corpus.records().iter().map(|r| r.message.as_str()).collect();
        assert_eq!(msgs, ["first", "second", "third"]);
        assert!(corpus
            .records()
            .windows(2)
            .all(|w| w[0].t.nanos() <= w[1].t.nanos()));
    }

    #[test]
    fn test_distinct_sets() {
        let text = [
            line(Some("N2"), "consensus", "warn", "zeta", "2019-05-15T00:00:01Z"),
            line(Some("N1"), "network", "info", "alpha", "2019-05-15T00:00:02Z"),
            line(Some("N2"), "consensus", "warn", "alpha", "2019-05-15T00:00:03Z"),
            line(Some("N3"), "consensus", "eror", "mid", "2019-05-15T00:00:04Z"),
        ]
        .join("\n");

        let corpus = LogCorpus::load(&text);
        assert_eq!(corpus.nodes(), ["N1", "N2", "N3"]);
        assert_eq!(corpus.modules(), ["consensus", "network"]);
        assert_eq!(corpus.levels(), ["warn", "info", "eror"]);
        assert_eq!(corpus.messages(), ["alpha", "mid", "zeta"]);
        assert_eq!(corpus.node_index("N2"), Some(1));
        assert_eq!(corpus.node_index("N9"), None);
    }

    #[test]
    fn test_missing_node_excluded() {
        let text = [
            line(Some("A"), "m", "info", "kept", "2019-05-15T00:00:01Z"),
            line(None, "ghost", "crit", "dropped", "2019-05-15T00:00:02Z"),
        ]
        .join("\n");

        let corpus = LogCorpus::load(&text);
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.modules(), ["m"]);
        assert_eq!(corpus.levels(), ["info"]);
        assert_eq!(corpus.messages(), ["kept"]);
        assert_eq!(corpus.stats().without_node, 1);
    }

    #[test]
    fn test_bad_lines_skipped() {
        let text = format!(
            "{}\nnot json at all\n{{\"module\":\"m\"}}\n\n{}\n",
            line(Some("A"), "m", "info", "one", "2019-05-15T00:00:01Z"),
            line(Some("A"), "m", "info", "two", "2019-05-15T00:00:02Z"),
        );

        let corpus = LogCorpus::load(&text);
        assert_eq!(corpus.len(), 2);
        let s = corpus.stats();
        assert_eq!(s.lines, 4);
        assert_eq!(s.malformed, 1);
        assert_eq!(s.rejected, 1);
        assert_eq!(s.accepted, 2);
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let text = [
            line(Some("A"), "m", "info", "x", "2019-05-15T00:00:01Z"),
            line(Some("B"), "m", "info", "y", "2019-05-15T00:00:01Z"),
        ]
        .join("\n");
        let corpus = LogCorpus::load(&text);
        assert_eq!(corpus.records()[0].message, "x");
        assert_eq!(corpus.records()[1].message, "y");
    }

    #[test]
    fn test_load_bytes() {
        let ok = line(Some("A"), "m", "info", "one", "2019-05-15T00:00:01Z");
        assert_eq!(LogCorpus::load_bytes(ok.as_bytes()).unwrap().len(), 1);
        assert!(LogCorpus::load_bytes(b"").unwrap().is_empty());

        assert!(matches!(
            LogCorpus::load_bytes(&[0xff, 0xfe, 0x00, 0x81]),
            Err(ViewerError::InvalidInput(_))
        ));
        assert!(matches!(
            LogCorpus::load_bytes(b"hello\nworld\n"),
            Err(ViewerError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_far_future_years_kept() {
        let text = [
            line(Some("A"), "m", "info", "late", "2300-01-01T00:00:00Z"),
            line(Some("A"), "m", "info", "early", "2019-05-15T00:00:01Z"),
        ]
        .join("\n");

        let corpus = LogCorpus::load(&text);
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.stats().rejected, 0);
        assert_eq!(corpus.records()[1].message, "late");
    }

    #[test]
    fn test_summary() {
        let text = line(Some("A"), "m", "info", "one", "2019-05-15T00:00:01Z");
        let s = LogCorpus::load(&text).summary();
        assert_eq!(s.records, 1);
        assert_eq!(s.nodes, ["A"]);
        assert_eq!(s.messages, 1);
    }
}
