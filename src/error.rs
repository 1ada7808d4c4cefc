use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid time: {0}")]
    InvalidTime(String),

    #[error("{0} is missing")]
    MissingField(&'static str),

    #[error("Invalid filter: {0}")]
    FilterConfig(String),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("No log sources given")]
    NoSources,

    #[error("Source error: {0}")]
    Source(String),
}

impl ViewerError {
    /// True for errors produced while compiling a message filter
    pub fn is_filter_config(&self) -> bool {
        matches!(self, ViewerError::FilterConfig(_) | ViewerError::Regex(_))
    }
}

impl From<ViewerError> for String {
    fn from(e: ViewerError) -> Self {
        e.to_string()
    }
}

impl From<anyhow::Error> for ViewerError {
    fn from(e: anyhow::Error) -> Self {
        ViewerError::Source(format!("{:#}", e))
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;
