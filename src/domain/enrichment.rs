/// Canonical metadata for a scraped title, taken from the suggestion index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentRecord {
    pub id: String,
    pub year: Option<String>,
    pub poster_url: Option<String>,
    pub synopsis: Option<String>,
}

/// Result of one enrichment lookup.
///
/// `Unavailable` covers timeouts, non-success statuses and undecodable
/// responses. Callers treat it exactly like `NoMatch`; the reason is only kept
/// for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    Matched(EnrichmentRecord),
    NoMatch,
    Unavailable(String),
}

impl EnrichmentOutcome {
    #[must_use]
    pub fn into_match(self) -> Option<EnrichmentRecord> {
        match self {
            EnrichmentOutcome::Matched(record) => Some(record),
            EnrichmentOutcome::NoMatch | EnrichmentOutcome::Unavailable(_) => None,
        }
    }
}
