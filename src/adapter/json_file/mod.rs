// Mirror the latest scraped batch to a JSON file.
// Each export writes a uniquely named temp file next to the target and then
// renames it over the target, so readers never see a partial document and
// overlapping exports never share a temp file.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

use crate::domain::ContentRecord;
use crate::port::BatchSink;

#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn write_atomically(target: &Path, json: &[u8]) -> Result<()> {
    let dir = match target.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
            parent
        }
        None => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    temp.write_all(json)
        .with_context(|| format!("failed to write {}", temp.path().display()))?;
    temp.persist(target)
        .with_context(|| format!("failed to move batch into {}", target.display()))?;
    Ok(())
}

#[async_trait]
impl BatchSink for JsonFileSink {
    async fn export(&self, records: &[ContentRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let json = serde_json::to_vec_pretty(records).context("failed to serialize batch")?;
        let target = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&target, &json))
            .await
            .context("export task panicked")??;

        info!(path = %self.path.display(), count = records.len(), "exported scraped batch");
        Ok(())
    }
}
