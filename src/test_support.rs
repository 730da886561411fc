//! Shared test support utilities
//!
//! Fakes for every port so unit and integration tests can drive the refresh
//! pipeline without network or database access.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::adapter::memory::InMemoryStore;
use crate::domain::{ContentRecord, ContentType, EnrichmentOutcome, EnrichmentRecord, SourceOutcome};
use crate::error::StoreError;
use crate::port::{BatchSink, EnrichmentLookup, MediaStore, SourceAdapter};

pub fn movie(id: &str, name: &str) -> ContentRecord {
    ContentRecord::new(id, ContentType::Movie, name)
}

pub fn series(id: &str, name: &str) -> ContentRecord {
    ContentRecord::new(id, ContentType::Series, name)
}

/// In-memory store holding exactly `records`, timestamps untouched.
pub async fn seeded_store(records: Vec<ContentRecord>) -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    if !records.is_empty() {
        store
            .replace_all(records)
            .await
            .expect("seeding the in-memory store");
    }
    store
}

pub fn enrichment_match(id: &str, year: &str) -> EnrichmentRecord {
    EnrichmentRecord {
        id: id.to_string(),
        year: Some(year.to_string()),
        poster_url: Some(format!("https://m.media-amazon.com/images/{id}.jpg")),
        synopsis: None,
    }
}

/// Store whose every operation fails as if the backend were down.
pub struct FailingStore;

impl FailingStore {
    fn down() -> StoreError {
        StoreError::Unavailable("backend offline".to_string())
    }
}

#[async_trait]
impl MediaStore for FailingStore {
    async fn newest_created_at(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Err(Self::down())
    }

    async fn find_by_type(
        &self,
        _content_type: ContentType,
        _limit: usize,
    ) -> Result<Vec<ContentRecord>, StoreError> {
        Err(Self::down())
    }

    async fn replace_all(&self, _records: Vec<ContentRecord>) -> Result<usize, StoreError> {
        Err(Self::down())
    }

    async fn insert_new(&self, _records: Vec<ContentRecord>) -> Result<usize, StoreError> {
        Err(Self::down())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Err(Self::down())
    }
}

/// Source adapter returning a canned outcome and counting page fetches.
pub struct FakeSource {
    name: String,
    outcome: SourceOutcome,
    delay: Option<Duration>,
    calls: AtomicUsize,
    visited: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new(name: &str, outcome: SourceOutcome) -> Self {
        Self {
            name: name.to_string(),
            outcome,
            delay: None,
            calls: AtomicUsize::new(0),
            visited: Mutex::new(Vec::new()),
        }
    }

    pub fn records(name: &str, records: Vec<ContentRecord>) -> Self {
        Self::new(name, SourceOutcome::from_records(records))
    }

    pub fn empty(name: &str) -> Self {
        Self::new(name, SourceOutcome::Empty)
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `fetch` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceAdapter for FakeSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, source_url: &str, content_type: ContentType) -> SourceOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.visited.lock().unwrap().push(source_url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.outcome {
            SourceOutcome::Records(records) => SourceOutcome::Records(
                records
                    .iter()
                    .cloned()
                    .map(|mut record| {
                        record.content_type = content_type;
                        record
                    })
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

/// Enrichment lookup answering from a fixed title table.
#[derive(Default)]
pub struct FakeEnrichment {
    matches: HashMap<String, EnrichmentRecord>,
}

impl FakeEnrichment {
    #[must_use]
    pub fn with_match(mut self, title: &str, record: EnrichmentRecord) -> Self {
        self.matches.insert(title.to_string(), record);
        self
    }
}

#[async_trait]
impl EnrichmentLookup for FakeEnrichment {
    async fn resolve(&self, title: &str) -> EnrichmentOutcome {
        self.matches
            .get(title)
            .cloned()
            .map_or(EnrichmentOutcome::NoMatch, EnrichmentOutcome::Matched)
    }
}

/// Sink that keeps every exported batch, or fails every export.
#[derive(Default)]
pub struct RecordingSink {
    batches: Mutex<Vec<Vec<ContentRecord>>>,
    fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn batches(&self) -> Vec<Vec<ContentRecord>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl BatchSink for RecordingSink {
    async fn export(&self, records: &[ContentRecord]) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("sink rejected batch");
        }
        self.batches.lock().unwrap().push(records.to_vec());
        Ok(())
    }
}
