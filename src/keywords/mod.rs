//! Keyword specs, the tracked set, and batch scanning.

pub mod matcher;
pub mod parser;
pub mod set;

pub use matcher::{DetectionEvent, KeywordMatcher, MatchOutcome};
pub use parser::{KeywordSpec, parse_list, parse_spec};
pub use set::{Keyword, KeywordSet};
