pub mod merge;
pub mod refresh;
pub mod staleness;

pub use merge::{dedup_by_id, dedup_by_name, merge};
pub use refresh::{
    PersistOutcome, RefreshCoordinator, RefreshOrchestrator, RefreshReport, SourcePlan, SourceRole,
};
pub use staleness::{DEFAULT_STALENESS_HOURS, StalenessGate, is_stale};
