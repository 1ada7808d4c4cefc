mod corpus;
pub mod record;
pub mod sample;
pub mod source;

pub use corpus::{LoadStats, LogCorpus};
pub use record::{LogRecord, RecordBasic};
pub use sample::SAMPLE_LOG;
pub use source::read_sources;
