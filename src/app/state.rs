use std::sync::Arc;
use tracing::info;

use crate::adapter::imdb::SuggestionClient;
use crate::adapter::json_file::JsonFileSink;
use crate::adapter::memory::InMemoryStore;
use crate::adapter::netflix::{GenreAdapter, PageFetcher, Top10Adapter};
use crate::adapter::postgres::PgMediaStore;
use crate::config::Config;
use crate::domain::ContentType;
use crate::error::CatalogError;
use crate::pipeline::{RefreshOrchestrator, SourcePlan, StalenessGate};
use crate::port::{EnrichmentLookup, MediaStore, SourceAdapter};
use crate::service::QueryService;

/// Wired components shared by the server and the one-shot refresh command.
pub struct AppState {
    pub orchestrator: Arc<RefreshOrchestrator>,
    pub query: Arc<QueryService>,
}

impl AppState {
    /// Connects the store and builds the refresh pipeline from `config`.
    ///
    /// # Errors
    /// Fails when Postgres is configured but unreachable, or when an HTTP
    /// client cannot be built.
    pub async fn from_config(config: &Config) -> Result<Self, CatalogError> {
        let store = connect_store(config).await?;

        let enrichment: Arc<dyn EnrichmentLookup> = Arc::new(
            SuggestionClient::new(config.enrichment_base_url(), config.enrichment_timeout())
                .map_err(|source| CatalogError::Init {
                    component: "enrichment client",
                    source,
                })?,
        );
        let pages = PageFetcher::new(config.source_timeout()).map_err(|source| CatalogError::Init {
            component: "source page client",
            source,
        })?;

        let sources = source_plans(config, pages, enrichment);
        let gate = StalenessGate::new(Arc::clone(&store), config.staleness_window());
        let mut orchestrator = RefreshOrchestrator::new(gate, Arc::clone(&store), sources);
        if let Some(path) = config.export_path() {
            info!(path = %path.display(), "scraped batches will be exported");
            orchestrator = orchestrator.with_sink(Arc::new(JsonFileSink::new(path)));
        }

        let orchestrator = Arc::new(orchestrator);
        let query = Arc::new(QueryService::new(Arc::clone(&orchestrator), store));
        Ok(Self { orchestrator, query })
    }
}

async fn connect_store(config: &Config) -> Result<Arc<dyn MediaStore>, CatalogError> {
    match config.database_url() {
        Some(dsn) => {
            let store = PgMediaStore::connect(dsn, config.database_max_connections()).await?;
            info!("using Postgres media store");
            Ok(Arc::new(store))
        }
        None => {
            info!("DATABASE_URL not set, using in-memory media store");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

fn source_plans(
    config: &Config,
    pages: PageFetcher,
    enrichment: Arc<dyn EnrichmentLookup>,
) -> Vec<SourcePlan> {
    let top10: Arc<dyn SourceAdapter> =
        Arc::new(Top10Adapter::new(pages.clone(), Arc::clone(&enrichment)));
    let mut plans = vec![
        SourcePlan::primary(Arc::clone(&top10), config.top10_series_url(), ContentType::Series),
        SourcePlan::primary(top10, config.top10_movies_url(), ContentType::Movie),
    ];

    if !config.genre_urls().is_empty() {
        let genre = Arc::new(GenreAdapter::new(
            pages,
            enrichment,
            config.genre_labels().to_vec(),
        ));
        plans.push(SourcePlan::secondary(
            genre,
            config.genre_urls().to_vec(),
            config.genre_content_type(),
        ));
    }

    plans
}
