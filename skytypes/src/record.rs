use derive_more::Display;
use serde::Serialize;

/// A three-line element set entry
/// https://en.wikipedia.org/wiki/Two-line_element_set
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, Serialize)]
#[display(fmt = "{}", "designation")]
pub struct CatalogRecord {
    /// Object name line, trimmed. e.g. STARLINK-11044 [DTC]
    pub designation: String,
    /// Element line 1, verbatim
    pub line1: String,
    /// Element line 2, verbatim
    pub line2: String,
}

impl CatalogRecord {
    pub fn new(
        designation: impl Into<String>,
        line1: impl Into<String>,
        line2: impl Into<String>,
    ) -> Self {
        Self {
            designation: designation.into().trim().to_string(),
            line1: line1.into(),
            line2: line2.into(),
        }
    }

    /// The satellite catalog number, columns 3-7 of line 1
    pub fn catalog_number(&self) -> Option<u32> {
        self.line1.get(2..7)?.trim().parse().ok()
    }
}
