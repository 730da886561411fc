use std::collections::HashSet;
use std::hash::Hash;

use crate::domain::ContentRecord;

/// Concatenates batches in input order and keeps the first record per id.
///
/// Records without an identity are dropped here as well, so the result is
/// always safe to persist.
pub fn merge<I, B>(batches: I) -> Vec<ContentRecord>
where
    I: IntoIterator<Item = B>,
    B: IntoIterator<Item = ContentRecord>,
{
    dedup_by_id(
        batches
            .into_iter()
            .flatten()
            .filter(ContentRecord::has_identity),
    )
}

pub fn dedup_by_id(records: impl IntoIterator<Item = ContentRecord>) -> Vec<ContentRecord> {
    dedup_by_key(records, |record| record.id.clone())
}

/// Same-source pass used across the pages of one adapter invocation.
pub fn dedup_by_name(records: impl IntoIterator<Item = ContentRecord>) -> Vec<ContentRecord> {
    dedup_by_key(records, |record| record.name.clone())
}

fn dedup_by_key<K, F>(records: impl IntoIterator<Item = ContentRecord>, key: F) -> Vec<ContentRecord>
where
    K: Eq + Hash,
    F: Fn(&ContentRecord) -> K,
{
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(key(record)))
        .collect()
}
