use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::{ContentRecord, ContentType};
use crate::error::StoreError;
use crate::pipeline::merge::dedup_by_id;
use crate::port::MediaStore;

const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS media (
        id            TEXT PRIMARY KEY,
        content_type  TEXT NOT NULL CHECK (content_type IN ('movie', 'series')),
        name          TEXT NOT NULL,
        release_info  TEXT NOT NULL DEFAULT '',
        poster        TEXT,
        poster_shape  TEXT NOT NULL DEFAULT 'poster',
        description   TEXT NOT NULL DEFAULT '',
        genres        TEXT[] NOT NULL DEFAULT '{}',
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    ",
    "CREATE INDEX IF NOT EXISTS media_content_type_idx ON media (content_type)",
    "CREATE INDEX IF NOT EXISTS media_created_at_idx ON media (created_at DESC)",
];

const INSERT_IF_ABSENT: &str = r"
    INSERT INTO media
        (id, content_type, name, release_info, poster, poster_shape, description, genres, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, now()))
    ON CONFLICT (id) DO NOTHING
";

/// Postgres-backed catalog store.
#[derive(Clone)]
pub struct PgMediaStore {
    pool: PgPool,
}

impl PgMediaStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and ensures the `media` table exists.
    pub async fn connect(dsn: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(dsn)
            .await?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("media schema ready");
        Ok(())
    }

    async fn insert_one<'e, E>(executor: E, record: &ContentRecord) -> Result<usize, StoreError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let result = sqlx::query(INSERT_IF_ABSENT)
            .bind(record.id.clone())
            .bind(record.content_type.as_str())
            .bind(record.name.clone())
            .bind(record.release_info.clone())
            .bind(record.poster.clone())
            .bind(record.poster_shape.clone())
            .bind(record.description.clone())
            .bind(record.genres.clone())
            .bind(record.created_at)
            .execute(executor)
            .await?;
        Ok(usize::try_from(result.rows_affected()).unwrap_or(0))
    }
}

const SELECT_BY_TYPE: &str = r"
    SELECT id, content_type, name, release_info, poster, poster_shape,
           description, genres, created_at
    FROM media
    WHERE content_type = $1
    LIMIT $2
";

/// One `media` row as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
struct MediaRow {
    id: String,
    content_type: String,
    name: String,
    release_info: String,
    poster: Option<String>,
    poster_shape: String,
    description: String,
    genres: Vec<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MediaRow> for ContentRecord {
    type Error = StoreError;

    fn try_from(row: MediaRow) -> Result<Self, Self::Error> {
        let content_type = row
            .content_type
            .parse::<ContentType>()
            .map_err(|e| StoreError::Corrupt(format!("row {}: {e}", row.id)))?;

        Ok(ContentRecord {
            id: row.id,
            content_type,
            name: row.name,
            release_info: row.release_info,
            poster: row.poster,
            poster_shape: row.poster_shape,
            description: row.description,
            genres: row.genres,
            created_at: Some(row.created_at),
        })
    }
}

#[async_trait]
impl MediaStore for PgMediaStore {
    async fn newest_created_at(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let newest = sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT created_at FROM media ORDER BY created_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(newest)
    }

    async fn find_by_type(
        &self,
        content_type: ContentType,
        limit: usize,
    ) -> Result<Vec<ContentRecord>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, MediaRow>(SELECT_BY_TYPE)
            .bind(content_type.as_str())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ContentRecord::try_from).collect()
    }

    async fn replace_all(&self, records: Vec<ContentRecord>) -> Result<usize, StoreError> {
        let records = dedup_by_id(records.into_iter().filter(ContentRecord::has_identity));

        // Readers keep seeing the previous rows until commit.
        let mut tx = self.pool.begin().await?;
        let deleted = sqlx::query("DELETE FROM media").execute(&mut *tx).await?;
        let mut inserted = 0;
        for record in &records {
            inserted += Self::insert_one(&mut *tx, record).await?;
        }
        tx.commit().await?;

        debug!(deleted = deleted.rows_affected(), inserted, "media collection replaced");
        Ok(inserted)
    }

    async fn insert_new(&self, records: Vec<ContentRecord>) -> Result<usize, StoreError> {
        let records = dedup_by_id(records.into_iter().filter(ContentRecord::has_identity));
        let mut inserted = 0;
        for record in &records {
            inserted += Self::insert_one(&self.pool, record).await?;
        }
        Ok(inserted)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM media")
            .fetch_one(&self.pool)
            .await?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
