use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::{debug, error};

use crate::domain::{ContentRecord, ContentType};
use crate::pipeline::RefreshOrchestrator;
use crate::port::MediaStore;

/// Upper bound on records returned by one catalog query.
pub const MAX_RESULTS: usize = 100;

/// Serves catalog reads, refreshing stale data first.
pub struct QueryService {
    orchestrator: Arc<RefreshOrchestrator>,
    store: Arc<dyn MediaStore>,
}

impl QueryService {
    pub fn new(orchestrator: Arc<RefreshOrchestrator>, store: Arc<dyn MediaStore>) -> Self {
        Self { orchestrator, store }
    }

    #[must_use]
    pub fn orchestrator(&self) -> &RefreshOrchestrator {
        &self.orchestrator
    }

    /// Records of `content_type` in a fresh random order.
    ///
    /// `search` and `skip` are accepted for protocol compatibility and are
    /// not applied. Storage failures yield an empty list.
    pub async fn query(
        &self,
        content_type: ContentType,
        search: Option<&str>,
        skip: Option<usize>,
    ) -> Vec<ContentRecord> {
        if search.is_some() || skip.is_some() {
            debug!(?search, ?skip, "catalog extras received, not applied");
        }

        self.orchestrator.refresh_if_stale().await;

        let mut records = match self.store.find_by_type(content_type, MAX_RESULTS).await {
            Ok(records) => records,
            Err(error) => {
                error!(%error, %content_type, "catalog lookup failed");
                return Vec::new();
            }
        };

        records.shuffle(&mut rand::rng());
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{SourcePlan, StalenessGate};
    use crate::test_support::{FailingStore, FakeSource, movie, seeded_store, series};
    use chrono::{Duration, Utc};
    use std::collections::HashSet;

    fn service(store: Arc<dyn MediaStore>, sources: Vec<SourcePlan>) -> QueryService {
        let gate = StalenessGate::new(Arc::clone(&store), Duration::hours(48));
        let orchestrator = Arc::new(RefreshOrchestrator::new(gate, Arc::clone(&store), sources));
        QueryService::new(orchestrator, store)
    }

    #[tokio::test]
    async fn query_filters_by_exact_type() {
        let now = Utc::now();
        let store = seeded_store(vec![
            movie("tt1", "Film").stamped(now),
            series("tt2", "Show").stamped(now),
            movie("tt3", "Other film").stamped(now),
        ])
        .await;
        let service = service(store, vec![]);

        let movies = service.query(ContentType::Movie, None, None).await;

        assert_eq!(movies.len(), 2);
        assert!(movies.iter().all(|r| r.content_type == ContentType::Movie));
    }

    #[tokio::test]
    async fn query_caps_results() {
        let now = Utc::now();
        let records = (0..150)
            .map(|i| movie(&format!("tt{i}"), "Film").stamped(now))
            .collect();
        let service = service(seeded_store(records).await, vec![]);

        assert_eq!(service.query(ContentType::Movie, None, None).await.len(), MAX_RESULTS);
    }

    #[tokio::test]
    async fn query_order_changes_between_calls() {
        let now = Utc::now();
        let records = (0..30)
            .map(|i| movie(&format!("tt{i}"), "Film").stamped(now))
            .collect();
        let service = service(seeded_store(records).await, vec![]);

        let first: Vec<String> = service
            .query(ContentType::Movie, None, None)
            .await
            .into_iter()
            .map(|r| r.id)
            .collect();
        let mut reordered = false;
        for _ in 0..5 {
            let next: Vec<String> = service
                .query(ContentType::Movie, None, None)
                .await
                .into_iter()
                .map(|r| r.id)
                .collect();
            assert_eq!(
                next.iter().collect::<HashSet<_>>(),
                first.iter().collect::<HashSet<_>>()
            );
            reordered |= next != first;
        }

        assert!(reordered, "30 records kept the same order six times");
    }

    #[tokio::test]
    async fn storage_failure_yields_empty_list() {
        let source = Arc::new(FakeSource::records("top10", vec![movie("tt1", "One")]));
        let service = service(
            Arc::new(FailingStore),
            vec![SourcePlan::primary(source, "u", ContentType::Movie)],
        );

        assert!(service.query(ContentType::Movie, Some("one"), Some(0)).await.is_empty());
    }

    #[tokio::test]
    async fn extras_do_not_change_results() {
        let store = seeded_store(vec![movie("tt1", "Only").stamped(Utc::now())]).await;
        let service = service(store, vec![]);

        let plain = service.query(ContentType::Movie, None, None).await;
        let with_extras = service.query(ContentType::Movie, Some("nothing"), Some(50)).await;

        assert_eq!(plain, with_extras);
    }
}
