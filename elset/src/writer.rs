use skytypes::prelude::CatalogRecord;
use std::io;

/// Writes records back out in the three-line document form
pub fn write_catalog<'a, W: io::Write>(
    records: impl IntoIterator<Item = &'a CatalogRecord>,
    out: &mut W,
) -> io::Result<()> {
    for r in records.into_iter() {
        writeln!(out, "{}", r.designation)?;
        writeln!(out, "{}", r.line1)?;
        writeln!(out, "{}", r.line2)?;
    }
    Ok(())
}
