use chrono::Duration;
use std::sync::Arc;
use top10_catalog::domain::{ContentType, SourceOutcome};
use top10_catalog::error::SourceError;
use top10_catalog::pipeline::{RefreshOrchestrator, SourcePlan, StalenessGate};
use top10_catalog::port::{MediaStore, PAGE_DELAY, SourceAdapter};
use top10_catalog::service::QueryService;
use top10_catalog::test_support::{FakeSource, movie, seeded_store, series};

fn query_service(store: Arc<dyn MediaStore>, sources: Vec<SourcePlan>) -> QueryService {
    let gate = StalenessGate::new(Arc::clone(&store), Duration::hours(48));
    let orchestrator = Arc::new(RefreshOrchestrator::new(gate, Arc::clone(&store), sources));
    QueryService::new(orchestrator, store)
}

#[tokio::test]
async fn first_query_on_empty_store_refreshes() {
    let store = seeded_store(vec![]).await;
    let movies = Arc::new(FakeSource::records(
        "top10",
        vec![movie("tt1", "One"), movie("tt2", "Two"), movie("tt3", "Three")],
    ));
    let shows = Arc::new(FakeSource::records("top10", vec![series("tt4", "Four")]));
    let service = query_service(
        store.clone(),
        vec![
            SourcePlan::primary(shows, "https://top10.example/tv", ContentType::Series),
            SourcePlan::primary(movies, "https://top10.example", ContentType::Movie),
        ],
    );

    let results = service.query(ContentType::Movie, None, None).await;

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.content_type == ContentType::Movie));
    assert!(results.iter().all(|r| r.created_at.is_some()));
    assert_eq!(store.count().await.unwrap(), 4);
}

#[tokio::test]
async fn second_query_within_window_reuses_store() {
    let store = seeded_store(vec![]).await;
    let source = Arc::new(FakeSource::records("top10", vec![movie("tt1", "One")]));
    let service = query_service(
        store,
        vec![SourcePlan::primary(source.clone(), "u", ContentType::Movie)],
    );

    service.query(ContentType::Movie, None, None).await;
    service.query(ContentType::Movie, None, None).await;

    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn concurrent_stale_queries_run_one_scrape_cycle() {
    let store = seeded_store(vec![]).await;
    let source = Arc::new(
        FakeSource::records("top10", vec![movie("tt1", "One"), movie("tt2", "Two")])
            .with_delay(std::time::Duration::from_millis(100)),
    );
    let service = Arc::new(query_service(
        store,
        vec![SourcePlan::primary(source.clone(), "u", ContentType::Movie)],
    ));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.query(ContentType::Movie, None, None).await })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap().len(), 2);
    }

    assert_eq!(source.calls(), 1);
    assert_eq!(service.orchestrator().coordinator().generation(), 1);
}

#[tokio::test]
async fn all_sources_failing_keeps_stale_catalog_served() {
    let stale = chrono::Utc::now() - Duration::hours(49);
    let store = seeded_store(vec![movie("tt1", "Old but gold").stamped(stale)]).await;
    let failing = Arc::new(FakeSource::new(
        "top10",
        SourceOutcome::Failed(SourceError::Status {
            url: "u".into(),
            status: 503,
        }),
    ));
    let service = query_service(
        store,
        vec![SourcePlan::primary(failing.clone(), "u", ContentType::Movie)],
    );

    let results = service.query(ContentType::Movie, None, None).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "Old but gold");
    assert_eq!(failing.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn multi_page_fetch_waits_between_pages() {
    let source = FakeSource::records("genre", vec![movie("netflix_a", "A")]);
    let urls: Vec<String> = (1..=3).map(|i| format!("https://genre.example/{i}")).collect();

    let started = tokio::time::Instant::now();
    let outcome = source.fetch_all(&urls, ContentType::Movie).await;

    let waited = started.elapsed();
    assert!(waited >= PAGE_DELAY * 2, "waited {waited:?}");
    assert!(waited < PAGE_DELAY * 3, "waited {waited:?}");
    assert_eq!(source.visited(), urls);
    // The same title on every page collapses to one record.
    assert_eq!(outcome.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn single_page_fetch_does_not_wait() {
    let source = FakeSource::empty("genre");

    let started = tokio::time::Instant::now();
    let outcome = source
        .fetch_all(&["https://genre.example/1".to_string()], ContentType::Movie)
        .await;

    assert!(started.elapsed() < PAGE_DELAY);
    assert_eq!(outcome, SourceOutcome::Empty);
}
