use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::port::MediaStore;

pub const DEFAULT_STALENESS_HOURS: i64 = 48;

/// Decides whether the persisted catalog is due for a refresh.
#[derive(Clone)]
pub struct StalenessGate {
    store: Arc<dyn MediaStore>,
    window: Duration,
}

impl StalenessGate {
    pub fn new(store: Arc<dyn MediaStore>, window: Duration) -> Self {
        Self { store, window }
    }

    pub async fn is_stale(&self) -> bool {
        self.is_stale_at(Utc::now()).await
    }

    /// A failed lookup counts as "never refreshed".
    pub async fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        match self.store.newest_created_at().await {
            Ok(newest) => {
                let stale = is_stale(newest, now, self.window);
                debug!(newest = ?newest, stale, "evaluated catalog staleness");
                stale
            }
            Err(error) => {
                warn!(%error, "staleness lookup failed, treating catalog as stale");
                true
            }
        }
    }
}

#[must_use]
pub fn is_stale(newest: Option<DateTime<Utc>>, now: DateTime<Utc>, window: Duration) -> bool {
    match newest {
        None => true,
        Some(created_at) => now - created_at >= window,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContentRecord, ContentType};
    use crate::test_support::{FailingStore, seeded_store};

    fn window() -> Duration {
        Duration::hours(DEFAULT_STALENESS_HOURS)
    }

    #[test]
    fn empty_collection_is_stale() {
        assert!(is_stale(None, Utc::now(), window()));
    }

    #[test]
    fn forty_seven_hours_is_fresh() {
        let now = Utc::now();
        assert!(!is_stale(Some(now - Duration::hours(47)), now, window()));
    }

    #[test]
    fn forty_eight_hours_or_more_is_stale() {
        let now = Utc::now();
        assert!(is_stale(Some(now - Duration::hours(48)), now, window()));
        assert!(is_stale(Some(now - Duration::days(30)), now, window()));
    }

    #[tokio::test]
    async fn gate_reads_newest_record() {
        let now = Utc::now();
        let store = seeded_store(vec![
            ContentRecord::new("tt1", ContentType::Movie, "Old").stamped(now - Duration::hours(60)),
            ContentRecord::new("tt2", ContentType::Movie, "New").stamped(now - Duration::hours(1)),
        ])
        .await;

        let gate = StalenessGate::new(store, window());

        assert!(!gate.is_stale_at(now).await);
        assert!(gate.is_stale_at(now + Duration::hours(47)).await);
    }

    #[tokio::test]
    async fn gate_treats_lookup_failure_as_stale() {
        let gate = StalenessGate::new(Arc::new(FailingStore), window());
        assert!(gate.is_stale().await);
    }
}
