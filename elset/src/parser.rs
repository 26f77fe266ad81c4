//! A lenient parser for three-line element set documents, e.g. the
//! plain-text catalogs served by CelesTrak.
//!
//! The document is split into lines, blank lines are skipped, and each
//! run of three non-blank lines becomes a record. A trailing partial
//! group is dropped.

use crate::{LINES_PER_RECORD, LINE_DELIMITER};
use nom::{
    branch::alt,
    bytes::complete::take_till,
    character::complete::char,
    combinator::{rest, verify},
    error::ErrorKind,
    multi::many0,
    sequence::terminated,
};
use skytypes::prelude::*;
use tracing::debug;

pub type Result<I, O, E = ParseError<I>> = std::result::Result<(I, O), nom::Err<E>>;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ParseError<I> {
    #[error("Parse error")]
    Nom(I, ErrorKind),
}

pub fn parse_catalog(doc: &str) -> Result<&str, Vec<CatalogRecord>> {
    let (s, lines) = many0(line)(doc)?;
    let lines: Vec<&str> = lines.into_iter().filter(|l| !l.trim().is_empty()).collect();

    let groups = lines.chunks_exact(LINES_PER_RECORD);
    let dropped = groups.remainder().len();
    if dropped != 0 {
        debug!(dropped, "Dropping trailing partial element set");
    }

    let records = groups
        .map(|g| CatalogRecord::new(g[0], g[1], g[2]))
        .collect();
    Ok((s, records))
}

/// A single line without its terminator. Fails only on empty input.
fn line(s: &str) -> Result<&str, &str> {
    let (s, l) = alt((
        terminated(take_till(|c| c == LINE_DELIMITER), char(LINE_DELIMITER)),
        verify(rest, |r: &str| !r.is_empty()),
    ))(s)?;
    Ok((s, l.strip_suffix('\r').unwrap_or(l)))
}

impl<I> nom::error::ParseError<I> for ParseError<I> {
    fn from_error_kind(s: I, kind: ErrorKind) -> Self {
        ParseError::Nom(s, kind)
    }

    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const TLE_SET: &str = indoc! {r#"
        STARLINK-11000 [DTC]
        1 58000U 24001A   24150.50000000  .00001000  00000-0  50000-4 0  9997
        2 58000  43.0000   0.0000 0001500  90.0000   0.0000 15.20000000 10006

        STARLINK-11006
        1 58014U 24001C   24150.50000000  .00001000  00000-0  50000-4 0  9992
        2 58014  53.0000  60.0000 0001500  90.0000  94.0000 15.20000000 10001
        "#};

    #[test]
    fn parse_line() {
        assert_eq!(line("abc\ndef"), Ok(("def", "abc")));
        assert_eq!(line("abc\r\ndef"), Ok(("def", "abc")));
        assert_eq!(line("\n"), Ok(("", "")));
        assert_eq!(line("tail"), Ok(("", "tail")));
        assert!(line("").is_err());
    }

    #[test]
    fn parse_tle_set() {
        let (s, records) = parse_catalog(TLE_SET).unwrap();
        assert!(s.is_empty());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].designation, "STARLINK-11000 [DTC]");
        assert_eq!(records[1].designation, "STARLINK-11006");
        assert!(records[1].line1.starts_with("1 58014U"));
        assert!(records[1].line2.ends_with("10001"));
    }

    #[test]
    fn groups_of_three() {
        let doc = "A\nl1a\nl2a\nB\nl1b\nl2b";
        let (_, records) = parse_catalog(doc).unwrap();
        assert_eq!(
            records,
            vec![
                CatalogRecord::new("A", "l1a", "l2a"),
                CatalogRecord::new("B", "l1b", "l2b"),
            ]
        );
    }

    #[test]
    fn trailing_partial_group_is_dropped() {
        let (_, records) = parse_catalog("A\nl1a\nl2a\nB\nl1b\nl2b\nC\n").unwrap();
        assert_eq!(records.len(), 2);

        let (_, records) = parse_catalog("A\nl1a\nl2a\nB\nl1b\nl2b\nC\nl1c").unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn element_lines_are_verbatim() {
        let doc = "  PADDED NAME  \r\n1 line one  \r\n2 line two\r\n";
        let (_, records) = parse_catalog(doc).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].designation, "PADDED NAME");
        assert_eq!(records[0].line1, "1 line one  ");
        assert_eq!(records[0].line2, "2 line two");
    }

    #[test]
    fn empty_documents() {
        assert_eq!(parse_catalog(""), Ok(("", vec![])));
        assert_eq!(parse_catalog("\n\n   \n"), Ok(("", vec![])));
    }
}
