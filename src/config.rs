use crate::error::{Result, ViewerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default gap allowed between records merged into one display row
pub const DEFAULT_TIME_WINDOW_NANOS: i64 = 8_000_000;

/// Records fetched per "load more"
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// A header row is repeated every this many display rows
pub const DEFAULT_HEADER_INTERVAL: usize = 30;

const CONFIG_DIR_NAME: &str = "logweave";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewerConfig {
    pub time_window_nanos: i64,
    pub page_size: usize,
    pub header_interval: usize,
    pub case_insensitive: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            time_window_nanos: DEFAULT_TIME_WINDOW_NANOS,
            page_size: DEFAULT_PAGE_SIZE,
            header_interval: DEFAULT_HEADER_INTERVAL,
            case_insensitive: false,
        }
    }
}

impl ViewerConfig {
    /// Read a JSON config file; missing keys take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: ViewerConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `<config dir>/logweave/config.json`, or defaults when there is none
    pub fn load_or_default() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => {
                log::debug!("loading viewer config from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.time_window_nanos < 0 {
            return Err(ViewerError::Config(format!(
                "timeWindowNanos must not be negative: {}",
                self.time_window_nanos
            )));
        }
        if self.page_size == 0 {
            return Err(ViewerError::Config("pageSize must be at least 1".to_string()));
        }
        if self.header_interval == 0 {
            return Err(ViewerError::Config("headerInterval must be at least 1".to_string()));
        }
        Ok(())
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
