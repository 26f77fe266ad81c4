//! Parse a CelesTrak-style Starlink catalog excerpt

use elset::*;

const CATALOG: &str = include_str!("../test_fixtures/starlink_dtc.txt");

#[test]
fn starlink_fixture() {
    let (rest, records) = parse_catalog(CATALOG).unwrap();
    assert_eq!(rest, "");

    let line_count = CATALOG.lines().filter(|l| !l.trim().is_empty()).count();
    assert_eq!(records.len(), line_count / LINES_PER_RECORD);
    assert_eq!(records.len(), 12);

    for r in records.iter() {
        assert!(r.designation.starts_with("STARLINK-"));
        assert!(r.line1.starts_with("1 "));
        assert!(r.line2.starts_with("2 "));
        assert_eq!(r.line1.len(), 69);
        assert_eq!(r.line2.len(), 69);
    }

    let dtc = records
        .iter()
        .filter(|r| r.designation.ends_with("[DTC]"))
        .count();
    assert_eq!(dtc, 8);
}

#[test]
fn starlink_fixture_with_crlf() {
    let crlf = CATALOG.replace('\n', "\r\n");
    let (_, records) = parse_catalog(&crlf).unwrap();
    assert_eq!(records.len(), 12);
    assert!(records.iter().all(|r| !r.line2.ends_with('\r')));
}
