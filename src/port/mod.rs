//! Seams between the refresh pipeline and its external collaborators.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{info, warn};

use crate::domain::{ContentRecord, ContentType, EnrichmentOutcome, SourceOutcome};
use crate::error::StoreError;
use crate::pipeline::merge::dedup_by_name;

/// Fixed wait between consecutive page fetches of one multi-page scrape.
pub const PAGE_DELAY: Duration = Duration::from_secs(2);

/// Converts one external content source into normalized records.
///
/// `fetch` never fails: network, markup and enrichment problems surface as
/// `SourceOutcome::Empty` or `SourceOutcome::Failed` and are logged by the
/// implementation.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, source_url: &str, content_type: ContentType) -> SourceOutcome;

    /// Fetches several pages of the same source, pacing requests with
    /// [`PAGE_DELAY`] and dropping repeated titles across pages.
    async fn fetch_all(&self, source_urls: &[String], content_type: ContentType) -> SourceOutcome {
        let mut pages = Vec::with_capacity(source_urls.len());
        let mut first_failure = None;

        for (index, url) in source_urls.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(PAGE_DELAY).await;
            }
            info!(source = self.name(), %url, %content_type, "scraping source page");
            match self.fetch(url, content_type).await {
                SourceOutcome::Records(records) => pages.push(records),
                SourceOutcome::Empty => {}
                SourceOutcome::Failed(error) => {
                    warn!(source = self.name(), %url, %error, "source page failed");
                    first_failure.get_or_insert(error);
                }
            }
        }

        let merged = dedup_by_name(pages.into_iter().flatten());
        match (merged.is_empty(), first_failure) {
            (true, Some(error)) => SourceOutcome::Failed(error),
            _ => SourceOutcome::from_records(merged),
        }
    }
}

/// Resolves a free-text title against an external suggestion index.
#[async_trait]
pub trait EnrichmentLookup: Send + Sync {
    async fn resolve(&self, title: &str) -> EnrichmentOutcome;
}

/// Document collection holding the persisted catalog.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// `createdAt` of the most recently persisted record.
    async fn newest_created_at(&self) -> Result<Option<DateTime<Utc>>, StoreError>;

    async fn find_by_type(
        &self,
        content_type: ContentType,
        limit: usize,
    ) -> Result<Vec<ContentRecord>, StoreError>;

    /// Replaces the whole collection. Readers observe either the old or the
    /// new collection, never an empty one in between.
    async fn replace_all(&self, records: Vec<ContentRecord>) -> Result<usize, StoreError>;

    /// Inserts records whose id is not stored yet; returns how many were added.
    async fn insert_new(&self, records: Vec<ContentRecord>) -> Result<usize, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}

/// Export target for freshly scraped batches.
#[async_trait]
pub trait BatchSink: Send + Sync {
    async fn export(&self, records: &[ContentRecord]) -> anyhow::Result<()>;
}
