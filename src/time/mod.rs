mod timestamp;

pub use timestamp::{Timestamp, ZERO_ELAPSED};
