pub use crate::parser::{parse_catalog, ParseError};
pub use crate::writer::write_catalog;

pub mod parser;
pub mod writer;

/// Designation line followed by the two element lines
pub const LINES_PER_RECORD: usize = 3;
pub const LINE_DELIMITER: char = '\n';
