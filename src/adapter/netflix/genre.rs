use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use super::extract::{Candidate, extract_genre_candidates, slug};
use super::page::PageFetcher;
use crate::domain::{ContentRecord, ContentType, EnrichmentRecord, PLACEHOLDER_POSTER, SourceOutcome};
use crate::error::SourceError;
use crate::port::{EnrichmentLookup, SourceAdapter};

pub const GENRE_CARD_LIMIT: usize = 20;
pub const LOOSE_SCAN_LIMIT: usize = 10;

/// Scrapes Netflix genre browse pages.
///
/// Unlike the ranked lists, genre titles are kept without a suggestion match;
/// they get a deterministic `netflix_<slug>` id and source defaults instead.
pub struct GenreAdapter {
    pages: PageFetcher,
    enrichment: Arc<dyn EnrichmentLookup>,
    labels: Vec<String>,
}

impl GenreAdapter {
    pub fn new(pages: PageFetcher, enrichment: Arc<dyn EnrichmentLookup>, labels: Vec<String>) -> Self {
        Self {
            pages,
            enrichment,
            labels,
        }
    }

    async fn enrich(&self, candidate: Candidate, content_type: ContentType) -> ContentRecord {
        let matched = self.enrichment.resolve(&candidate.title).await.into_match();
        to_record(candidate, matched, content_type, &self.labels)
    }
}

fn to_record(
    candidate: Candidate,
    matched: Option<EnrichmentRecord>,
    content_type: ContentType,
    labels: &[String],
) -> ContentRecord {
    let matched = matched.unwrap_or_else(|| EnrichmentRecord {
        id: format!("netflix_{}", slug(&candidate.title)),
        year: None,
        poster_url: None,
        synopsis: None,
    });

    let description = matched
        .synopsis
        .or(candidate.blurb)
        .unwrap_or_else(|| format!("{} - Available on Netflix", candidate.title));

    let mut record = ContentRecord::new(matched.id, content_type, candidate.title);
    record.release_info = matched.year.unwrap_or_default();
    record.poster = Some(
        matched
            .poster_url
            .or(candidate.poster)
            .unwrap_or_else(|| PLACEHOLDER_POSTER.to_string()),
    );
    record.description = description;
    record.genres = labels.to_vec();
    record
}

#[async_trait]
impl SourceAdapter for GenreAdapter {
    fn name(&self) -> &str {
        "genre"
    }

    async fn fetch(&self, source_url: &str, content_type: ContentType) -> SourceOutcome {
        let html = match self.pages.fetch(source_url).await {
            Ok(html) => html,
            Err(error) => {
                warn!(%error, "genre page unavailable");
                return SourceOutcome::Failed(error);
            }
        };

        let candidates = extract_genre_candidates(&html, GENRE_CARD_LIMIT, LOOSE_SCAN_LIMIT);
        if candidates.is_empty() {
            warn!(url = %source_url, "no title cards found, markup may have changed");
            return SourceOutcome::Failed(SourceError::Markup {
                url: source_url.to_string(),
            });
        }

        let records = join_all(
            candidates
                .into_iter()
                .map(|candidate| self.enrich(candidate, content_type)),
        )
        .await;

        info!(url = %source_url, %content_type, count = records.len(), "genre page scraped");
        SourceOutcome::from_records(records)
    }
}
