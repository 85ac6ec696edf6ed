//! PREMIS event envelope parsing.

mod parser;

pub use parser::{parse_events, ParseError};
