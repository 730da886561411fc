use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::domain::{ContentRecord, ContentType};
use crate::error::StoreError;
use crate::pipeline::merge::dedup_by_id;
use crate::port::MediaStore;

/// Process-local catalog store.
///
/// Writers build a complete new collection and swap the shared snapshot, so
/// readers holding the previous `Arc` keep a consistent view.
#[derive(Default)]
pub struct InMemoryStore {
    snapshot: RwLock<Arc<Vec<ContentRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self) -> Result<Arc<Vec<ContentRecord>>, StoreError> {
        self.snapshot
            .read()
            .map(|guard| Arc::clone(&guard))
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".into()))
    }

    fn swap<F>(&self, build: F) -> Result<usize, StoreError>
    where
        F: FnOnce(&[ContentRecord]) -> (Vec<ContentRecord>, usize),
    {
        let mut guard = self
            .snapshot
            .write()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".into()))?;
        let (next, written) = build(&guard);
        *guard = Arc::new(next);
        Ok(written)
    }
}

#[async_trait]
impl MediaStore for InMemoryStore {
    async fn newest_created_at(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self.current()?.iter().filter_map(|r| r.created_at).max())
    }

    async fn find_by_type(
        &self,
        content_type: ContentType,
        limit: usize,
    ) -> Result<Vec<ContentRecord>, StoreError> {
        Ok(self
            .current()?
            .iter()
            .filter(|r| r.content_type == content_type)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn replace_all(&self, records: Vec<ContentRecord>) -> Result<usize, StoreError> {
        let next = dedup_by_id(records.into_iter().filter(ContentRecord::has_identity));
        self.swap(move |_| {
            let stored = next.len();
            (next, stored)
        })
    }

    async fn insert_new(&self, records: Vec<ContentRecord>) -> Result<usize, StoreError> {
        let incoming = dedup_by_id(records.into_iter().filter(ContentRecord::has_identity));
        self.swap(move |existing| {
            let known: HashSet<&str> = existing.iter().map(|r| r.id.as_str()).collect();
            let fresh: Vec<ContentRecord> = incoming
                .into_iter()
                .filter(|r| !known.contains(r.id.as_str()))
                .collect();
            let added = fresh.len();
            let mut next = existing.to_vec();
            next.extend(fresh);
            (next, added)
        })
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.current()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{movie, series};
    use chrono::Duration;

    #[tokio::test]
    async fn replace_all_swaps_whole_collection() {
        let store = InMemoryStore::new();
        store
            .replace_all(vec![movie("tt1", "Old"), series("tt2", "Old show")])
            .await
            .unwrap();

        let reader_view = store.current().unwrap();
        let stored = store
            .replace_all(vec![movie("tt3", "New"), movie("tt3", "New duplicate")])
            .await
            .unwrap();

        assert_eq!(stored, 1);
        assert_eq!(reader_view.len(), 2, "earlier snapshot stays intact");
        let movies = store.find_by_type(ContentType::Movie, 100).await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].name, "New");
        assert!(store.find_by_type(ContentType::Series, 100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_new_skips_known_ids() {
        let store = InMemoryStore::new();
        store.replace_all(vec![movie("tt1", "Ranked")]).await.unwrap();

        let added = store
            .insert_new(vec![movie("tt1", "Genre copy"), movie("netflix_x", "Genre only")])
            .await
            .unwrap();

        assert_eq!(added, 1);
        assert_eq!(store.count().await.unwrap(), 2);
        let movies = store.find_by_type(ContentType::Movie, 100).await.unwrap();
        assert_eq!(movies[0].name, "Ranked");
    }

    #[tokio::test]
    async fn newest_created_at_takes_maximum() {
        let store = InMemoryStore::new();
        assert_eq!(store.newest_created_at().await.unwrap(), None);

        let now = Utc::now();
        store
            .replace_all(vec![
                movie("tt1", "A").stamped(now - Duration::hours(5)),
                movie("tt2", "B").stamped(now),
            ])
            .await
            .unwrap();

        assert_eq!(store.newest_created_at().await.unwrap(), Some(now));
    }

    #[tokio::test]
    async fn find_by_type_respects_limit() {
        let store = InMemoryStore::new();
        let records = (0..5).map(|i| movie(&format!("tt{i}"), "M")).collect();
        store.replace_all(records).await.unwrap();

        assert_eq!(store.find_by_type(ContentType::Movie, 3).await.unwrap().len(), 3);
    }
}
