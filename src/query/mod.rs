mod cursor;
mod filter;
mod state;

pub use cursor::FilterPage;
pub use filter::{compile_user_regex, parse_regex_literal, should_use_plain_search, MessagePattern, PatternFlags};
pub use state::{FilterScan, FilterState};
