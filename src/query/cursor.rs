use crate::parser::LogRecord;
use serde::Serialize;
use std::sync::Arc;

/// One "load more" batch of filtered records
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPage {
    /// Matching records, in time order
    pub records: Vec<Arc<LogRecord>>,
    /// Corpus records looked at to fill this page, matching or not
    pub examined: usize,
    /// Cursor position for the following page
    pub next_offset: usize,
    /// Whether the scan reached the end of the corpus
    pub exhausted: bool,
}

impl FilterPage {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_serialization() {
        let page = FilterPage {
            examined: 12,
            next_offset: 40,
            exhausted: true,
            ..Default::default()
        };
        let json = serde_json::to_string(&page).unwrap();
        assert!(json.contains("\"nextOffset\":40"));
        assert!(json.contains("\"exhausted\":true"));
        assert!(page.is_empty());
    }
}
