use regex::Regex;
use skytypes::prelude::CatalogRecord;
use std::{fmt, ops::Deref, path::PathBuf, sync::Arc};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum CatalogFetchFailure {
    #[error("Catalog request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Catalog endpoint returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to read catalog file '{}': {source}", path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed catalog document: {0}")]
    Malformed(String),
}

/// Where the element set document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Http(Url),
    File(PathBuf),
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::Http(url) => write!(f, "{url}"),
            CatalogSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl CatalogSource {
    pub async fn fetch(&self) -> Result<String, CatalogFetchFailure> {
        debug!(source = %self, "Fetching catalog");
        match self {
            CatalogSource::Http(url) => {
                let resp = reqwest::get(url.clone()).await?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(CatalogFetchFailure::Status(status));
                }
                Ok(resp.text().await?)
            }
            CatalogSource::File(path) => tokio::fs::read_to_string(path).await.map_err(|source| {
                CatalogFetchFailure::File {
                    path: path.clone(),
                    source,
                }
            }),
        }
    }
}

/// Retains records whose designation contains any of the substrings
/// (case-insensitive) or matches the pattern. An empty filter retains
/// everything.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    substrings: Vec<String>,
    pattern: Option<Regex>,
}

impl NameFilter {
    pub fn new<S: AsRef<str>>(substrings: impl IntoIterator<Item = S>, pattern: Option<Regex>) -> Self {
        Self {
            substrings: substrings
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            pattern,
        }
    }

    pub fn substrings<S: AsRef<str>>(substrings: impl IntoIterator<Item = S>) -> Self {
        Self::new(substrings, None)
    }

    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.pattern = Some(Regex::new(pattern)?);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.substrings.is_empty() && self.pattern.is_none()
    }

    pub fn matches(&self, designation: &str) -> bool {
        if self.is_empty() {
            return true;
        }
        let folded = designation.to_lowercase();
        self.substrings.iter().any(|s| folded.contains(s.as_str()))
            || self
                .pattern
                .as_ref()
                .map(|p| p.is_match(designation))
                .unwrap_or(false)
    }

    pub fn apply(&self, records: Vec<CatalogRecord>) -> Vec<CatalogRecord> {
        if self.is_empty() {
            return records;
        }
        records
            .into_iter()
            .filter(|r| self.matches(&r.designation))
            .collect()
    }
}

/// An immutable, cheaply cloned snapshot of the loaded records.
/// Refreshes replace the whole snapshot.
#[derive(Debug, Clone)]
pub struct Catalog(Arc<[CatalogRecord]>);

impl Catalog {
    pub fn empty() -> Self {
        Catalog::from(Vec::new())
    }

    pub fn records(&self) -> &[CatalogRecord] {
        &self.0
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<CatalogRecord>> for Catalog {
    fn from(records: Vec<CatalogRecord>) -> Self {
        Catalog(records.into())
    }
}

impl Deref for Catalog {
    type Target = [CatalogRecord];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Parse a document and apply the name filter. An empty result is valid.
pub fn parse_and_filter(doc: &str, filter: &NameFilter) -> Result<Catalog, CatalogFetchFailure> {
    let (_, records) =
        elset::parse_catalog(doc).map_err(|e| CatalogFetchFailure::Malformed(e.to_string()))?;
    let parsed = records.len();
    let records = filter.apply(records);
    info!(parsed, retained = records.len(), "Loaded catalog");
    if records.is_empty() {
        warn!("No catalog records matched the name filter");
    }
    Ok(Catalog::from(records))
}

pub async fn load_catalog(
    source: &CatalogSource,
    filter: &NameFilter,
) -> Result<Catalog, CatalogFetchFailure> {
    let doc = source.fetch().await?;
    parse_and_filter(&doc, filter)
}
