//! Challenge extraction and validation

pub mod authority;
pub mod parser;

pub use authority::{AuthorityValidator, validate};
pub use parser::{ChallengeParser, ParserState, parse_lines};
