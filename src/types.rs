use serde::{Deserialize, Serialize};

/// Wire form of a filter configuration, as sent by the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize, Default, Hash, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogFilters {
    pub levels: Option<Vec<String>>, // ["info","eror"] etc. empty = all
    pub message: Option<String>,     // "ballot" | "node (created|state)" | "/^.*sign.*$/i"
}

impl LogFilters {
    pub fn levels(levels: &[&str]) -> Self {
        Self {
            levels: Some(levels.iter().map(|l| l.to_string()).collect()),
            message: None,
        }
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }
}

/// Counts reported after a corpus import
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub records: usize,
    pub nodes: Vec<String>,
    pub modules: Vec<String>,
    pub levels: Vec<String>,
    pub messages: usize,
}
