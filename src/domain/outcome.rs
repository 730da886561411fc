use crate::domain::ContentRecord;
use crate::error::SourceError;

/// What a source adapter produced for one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    Records(Vec<ContentRecord>),
    Empty,
    Failed(SourceError),
}

impl SourceOutcome {
    /// Wraps a batch, collapsing an empty one to `Empty`.
    #[must_use]
    pub fn from_records(records: Vec<ContentRecord>) -> Self {
        if records.is_empty() {
            SourceOutcome::Empty
        } else {
            SourceOutcome::Records(records)
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            SourceOutcome::Records(records) => records.len(),
            SourceOutcome::Empty | SourceOutcome::Failed(_) => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn into_records(self) -> Vec<ContentRecord> {
        match self {
            SourceOutcome::Records(records) => records,
            SourceOutcome::Empty | SourceOutcome::Failed(_) => Vec::new(),
        }
    }
}
