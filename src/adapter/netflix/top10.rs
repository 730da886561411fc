use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::extract::{Candidate, extract_top10_candidates};
use super::page::PageFetcher;
use crate::domain::{ContentRecord, ContentType, EnrichmentRecord, PLACEHOLDER_POSTER, SourceOutcome};
use crate::error::SourceError;
use crate::port::{EnrichmentLookup, SourceAdapter};

/// Rows read from one ranked table.
pub const TOP10_ROW_LIMIT: usize = 10;

/// Scrapes a Netflix Top 10 table.
///
/// Ranked titles are only kept when the suggestion index resolves them to a
/// canonical id; the catalog client addresses titles by that id.
pub struct Top10Adapter {
    pages: PageFetcher,
    enrichment: Arc<dyn EnrichmentLookup>,
}

impl Top10Adapter {
    pub fn new(pages: PageFetcher, enrichment: Arc<dyn EnrichmentLookup>) -> Self {
        Self { pages, enrichment }
    }

    async fn enrich(&self, candidate: Candidate, content_type: ContentType) -> Option<ContentRecord> {
        let Some(matched) = self.enrichment.resolve(&candidate.title).await.into_match() else {
            debug!(title = %candidate.title, "dropping ranked title without canonical id");
            return None;
        };
        Some(to_record(candidate, matched, content_type))
    }
}

fn to_record(candidate: Candidate, matched: EnrichmentRecord, content_type: ContentType) -> ContentRecord {
    let mut record = ContentRecord::new(matched.id, content_type, candidate.title);
    record.release_info = matched.year.unwrap_or_default();
    record.poster = Some(
        matched
            .poster_url
            .or(candidate.poster)
            .unwrap_or_else(|| PLACEHOLDER_POSTER.to_string()),
    );
    record.description = candidate.blurb.or(matched.synopsis).unwrap_or_default();
    record
}

#[async_trait]
impl SourceAdapter for Top10Adapter {
    fn name(&self) -> &str {
        "top10"
    }

    async fn fetch(&self, source_url: &str, content_type: ContentType) -> SourceOutcome {
        let html = match self.pages.fetch(source_url).await {
            Ok(html) => html,
            Err(error) => {
                warn!(%error, "top10 page unavailable");
                return SourceOutcome::Failed(error);
            }
        };

        let candidates = extract_top10_candidates(&html, TOP10_ROW_LIMIT);
        if candidates.is_empty() {
            warn!(url = %source_url, "no ranked rows found, markup may have changed");
            return SourceOutcome::Failed(SourceError::Markup {
                url: source_url.to_string(),
            });
        }

        let found = candidates.len();
        let records: Vec<ContentRecord> = join_all(
            candidates
                .into_iter()
                .map(|candidate| self.enrich(candidate, content_type)),
        )
        .await
        .into_iter()
        .flatten()
        .collect();

        info!(%content_type, found, kept = records.len(), "top10 page scraped");
        SourceOutcome::from_records(records)
    }
}
