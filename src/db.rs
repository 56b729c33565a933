use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Json, Executor, Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    entities::{HistoryEntry, HistoryRecord},
    error::{record_error, Error},
    history::HistoryStore,
};

/// Durable history, one JSONB document per request.
#[derive(Debug)]
pub struct PgHistoryStore {
    pool: Pool<Postgres>,
}

impl PgHistoryStore {
    #[tracing::instrument(name = "PgHistoryStore::new", skip(db_uri))]
    pub async fn new(db_uri: &str, max_connections: u32) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(db_uri)
            .await?;

        pool.execute("CREATE TABLE IF NOT EXISTS route_history (id UUID PRIMARY KEY, created_at TIMESTAMPTZ NOT NULL, data JSONB NOT NULL)")
            .await?;
        pool.execute("CREATE INDEX IF NOT EXISTS route_history_created_at_idx ON route_history (created_at DESC)")
            .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    #[tracing::instrument(skip(self))]
    async fn record(&self, entry: HistoryEntry) -> Result<Uuid, Error> {
        let record = HistoryRecord::new(entry);

        let mut conn = self.pool.acquire().await.map_err(record_error)?;

        conn.execute(
            sqlx::query("INSERT INTO route_history (id, created_at, data) VALUES ($1, $2, $3)")
                .bind(&record.id)
                .bind(&record.timestamp)
                .bind(Json(&record)),
        )
        .await
        .map_err(record_error)?;

        Ok(record.id)
    }

    #[tracing::instrument(skip(self))]
    async fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>, Error> {
        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(
                sqlx::query("SELECT data FROM route_history ORDER BY created_at DESC LIMIT $1")
                    .bind(limit as i64),
            )
            .await?;

        let mut records = Vec::with_capacity(rows.len());

        for row in rows.iter() {
            let Json(record): Json<HistoryRecord> = row.try_get("data")?;
            records.push(record);
        }

        Ok(records)
    }
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL pointing at a scratch Postgres"]
async fn records_and_lists_history() {
    use crate::entities::Coordinates;

    let uri = std::env::var("TEST_DATABASE_URL").unwrap();
    let store = PgHistoryStore::new(&uri, 2).await.unwrap();

    let entry = HistoryEntry {
        origin_input: "53.3498,-6.2603".into(),
        destination_input: "53.3441,-6.2600".into(),
        origin: Coordinates::new(53.3498, -6.2603),
        destination: Coordinates::new(53.3441, -6.26),
        distance_m: 1200,
        duration: "180s".into(),
    };

    let first = store.record(entry.clone()).await.unwrap();
    let second = store.record(entry).await.unwrap();

    let recent = store.recent(2).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id, second);
    assert_eq!(recent[1].id, first);
    assert!(recent[0].timestamp >= recent[1].timestamp);
}
