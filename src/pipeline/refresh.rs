use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::domain::{ContentRecord, ContentType, SourceOutcome};
use crate::pipeline::merge::merge;
use crate::pipeline::staleness::StalenessGate;
use crate::port::{BatchSink, MediaStore, SourceAdapter};

/// How a source's records are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRole {
    /// Ranked list; a non-empty batch replaces the whole collection.
    Primary,
    /// Genre pages; records are added next to the existing collection.
    Secondary,
}

#[derive(Clone)]
pub struct SourcePlan {
    adapter: Arc<dyn SourceAdapter>,
    urls: Vec<String>,
    content_type: ContentType,
    role: SourceRole,
}

impl SourcePlan {
    pub fn primary(
        adapter: Arc<dyn SourceAdapter>,
        url: impl Into<String>,
        content_type: ContentType,
    ) -> Self {
        Self {
            adapter,
            urls: vec![url.into()],
            content_type,
            role: SourceRole::Primary,
        }
    }

    pub fn secondary(
        adapter: Arc<dyn SourceAdapter>,
        urls: Vec<String>,
        content_type: ContentType,
    ) -> Self {
        Self {
            adapter,
            urls,
            content_type,
            role: SourceRole::Secondary,
        }
    }

    fn label(&self) -> String {
        format!("{}:{}", self.adapter.name(), self.content_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Replaced(usize),
    Inserted(usize),
    Skipped,
    Failed(String),
}

impl PersistOutcome {
    #[must_use]
    pub fn wrote_records(&self) -> bool {
        matches!(self, PersistOutcome::Replaced(n) | PersistOutcome::Inserted(n) if *n > 0)
    }
}

/// Summary of one scrape-and-persist cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub primary: PersistOutcome,
    pub secondary: PersistOutcome,
    pub failed_sources: Vec<String>,
}

impl RefreshReport {
    #[must_use]
    pub fn persisted_any(&self) -> bool {
        self.primary.wrote_records() || self.secondary.wrote_records()
    }
}

/// Process-wide refresh state: the mutex serializing cycles, the attempt
/// generation and the last finished attempt.
#[derive(Default)]
pub struct RefreshCoordinator {
    gate: Arc<Mutex<()>>,
    generation: AtomicU64,
    in_flight: AtomicBool,
    last_report: RwLock<Option<RefreshReport>>,
}

impl RefreshCoordinator {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn last_report(&self) -> Option<RefreshReport> {
        self.last_report
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    async fn acquire(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.gate).lock_owned().await
    }

    fn begin(self: &Arc<Self>) -> InFlight {
        self.in_flight.store(true, Ordering::SeqCst);
        InFlight(Arc::clone(self))
    }

    fn complete(&self, report: RefreshReport) {
        if let Ok(mut guard) = self.last_report.write() {
            *guard = Some(report);
        }
        self.in_flight.store(false, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Clears the in-flight flag even if a cycle unwinds before completing.
struct InFlight(Arc<RefreshCoordinator>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.store(false, Ordering::SeqCst);
    }
}

/// Runs Staleness Gate → sources → merge → persistence, one cycle at a time.
///
/// Each cycle runs on its own task and owns the refresh lock until it
/// finishes, so dropping the request that triggered it does not cut the
/// cycle short.
pub struct RefreshOrchestrator {
    gate: StalenessGate,
    cycle: RefreshCycle,
}

impl RefreshOrchestrator {
    pub fn new(gate: StalenessGate, store: Arc<dyn MediaStore>, sources: Vec<SourcePlan>) -> Self {
        Self {
            gate,
            cycle: RefreshCycle {
                store,
                sources: Arc::from(sources),
                sink: None,
                exports: TaskTracker::new(),
                coordinator: Arc::new(RefreshCoordinator::default()),
            },
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn BatchSink>) -> Self {
        self.cycle.sink = Some(sink);
        self
    }

    #[must_use]
    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.cycle.coordinator
    }

    /// Refreshes the catalog when the Staleness Gate says so.
    ///
    /// Callers arriving while a cycle is running wait for it and then return
    /// without starting their own. Returns the report of the cycle this call
    /// ran, if any.
    pub async fn refresh_if_stale(&self) -> Option<RefreshReport> {
        let observed = self.coordinator().generation();
        if !self.gate.is_stale().await {
            return None;
        }

        let guard = self.coordinator().acquire().await;
        if self.coordinator().generation() != observed {
            debug!("refresh already completed by a concurrent caller");
            return None;
        }

        info!("catalog is stale, starting refresh");
        Some(self.spawn_cycle(guard).await)
    }

    /// Runs a cycle regardless of staleness, still serialized with other cycles.
    pub async fn force_refresh(&self) -> RefreshReport {
        let guard = self.coordinator().acquire().await;
        self.spawn_cycle(guard).await
    }

    /// Waits for batch exports still running in the background.
    pub async fn drain_exports(&self) {
        let exports = &self.cycle.exports;
        exports.close();
        exports.wait().await;
        exports.reopen();
    }

    async fn spawn_cycle(&self, guard: OwnedMutexGuard<()>) -> RefreshReport {
        let cycle = self.cycle.clone();
        let started_at = Utc::now();
        let handle = tokio::spawn(async move {
            let report = cycle.run().await;
            drop(guard);
            report
        });

        match handle.await {
            Ok(report) => report,
            Err(error) => {
                error!(%error, "refresh task ended without a report");
                let report = RefreshReport {
                    started_at,
                    finished_at: Utc::now(),
                    primary: PersistOutcome::Failed(error.to_string()),
                    secondary: PersistOutcome::Skipped,
                    failed_sources: Vec::new(),
                };
                self.coordinator().complete(report.clone());
                report
            }
        }
    }
}

/// Everything one cycle needs, cheap to clone onto its task.
#[derive(Clone)]
struct RefreshCycle {
    store: Arc<dyn MediaStore>,
    sources: Arc<[SourcePlan]>,
    sink: Option<Arc<dyn BatchSink>>,
    exports: TaskTracker,
    coordinator: Arc<RefreshCoordinator>,
}

impl RefreshCycle {
    async fn run(&self) -> RefreshReport {
        let _in_flight = self.coordinator.begin();
        let started_at = Utc::now();

        let outcomes = join_all(self.sources.iter().map(|plan| async move {
            let outcome = plan.adapter.fetch_all(&plan.urls, plan.content_type).await;
            (plan, outcome)
        }))
        .await;

        let mut primary_batches = Vec::new();
        let mut secondary_batches = Vec::new();
        let mut failed_sources = Vec::new();

        for (plan, outcome) in outcomes {
            let source = plan.label();
            match outcome {
                SourceOutcome::Records(records) => {
                    info!(%source, count = records.len(), "source produced records");
                    match plan.role {
                        SourceRole::Primary => primary_batches.push(records),
                        SourceRole::Secondary => secondary_batches.push(records),
                    }
                }
                SourceOutcome::Empty => {
                    warn!(%source, "source produced no records");
                    failed_sources.push(source);
                }
                SourceOutcome::Failed(error) => {
                    warn!(%source, %error, "source failed");
                    failed_sources.push(source);
                }
            }
        }

        let stamp = Utc::now();
        let primary = stamp_all(merge(primary_batches), stamp);
        let secondary = stamp_all(merge(secondary_batches), stamp);

        if primary.is_empty() && secondary.is_empty() {
            info!("no records scraped, stored catalog left untouched");
        } else {
            self.export(merge([primary.clone(), secondary.clone()]));
        }

        let primary_outcome = self.persist_primary(primary).await;
        let secondary_outcome = self.persist_secondary(secondary).await;

        let report = RefreshReport {
            started_at,
            finished_at: Utc::now(),
            primary: primary_outcome,
            secondary: secondary_outcome,
            failed_sources,
        };
        info!(
            primary = ?report.primary,
            secondary = ?report.secondary,
            failed_sources = report.failed_sources.len(),
            "refresh cycle finished"
        );
        self.coordinator.complete(report.clone());
        report
    }

    async fn persist_primary(&self, records: Vec<ContentRecord>) -> PersistOutcome {
        if records.is_empty() {
            return PersistOutcome::Skipped;
        }
        match self.store.replace_all(records).await {
            Ok(stored) => {
                info!(stored, "replaced catalog with primary records");
                PersistOutcome::Replaced(stored)
            }
            Err(error) => {
                error!(%error, "failed to replace catalog");
                PersistOutcome::Failed(error.to_string())
            }
        }
    }

    async fn persist_secondary(&self, records: Vec<ContentRecord>) -> PersistOutcome {
        if records.is_empty() {
            return PersistOutcome::Skipped;
        }
        let offered = records.len();
        match self.store.insert_new(records).await {
            Ok(inserted) => {
                info!(offered, inserted, "added genre records to catalog");
                PersistOutcome::Inserted(inserted)
            }
            Err(error) => {
                error!(%error, "failed to add genre records");
                PersistOutcome::Failed(error.to_string())
            }
        }
    }

    fn export(&self, batch: Vec<ContentRecord>) {
        let Some(sink) = self.sink.clone() else {
            return;
        };
        self.exports.spawn(async move {
            if let Err(error) = sink.export(&batch).await {
                warn!(error = %format!("{error:#}"), "failed to export scraped batch");
            }
        });
    }
}

fn stamp_all(records: Vec<ContentRecord>, at: DateTime<Utc>) -> Vec<ContentRecord> {
    records.into_iter().map(|record| record.stamped(at)).collect()
}
