use super::Engine;

use async_trait::async_trait;

use crate::{
    api::HistoryAPI,
    entities::{HistoryEntry, HistoryRecord},
    error::{Error, Stage},
};

impl Engine {
    /// Best-effort: a failed write is logged and dropped.
    #[tracing::instrument(skip(self, entry))]
    pub async fn record_history(&self, entry: HistoryEntry) {
        match self.history.record(entry).await {
            Ok(id) => tracing::info!(%id, "recorded route history"),
            Err(err) => tracing::warn!("{}", err.in_stage(Stage::Recording)),
        }
    }
}

#[async_trait]
impl HistoryAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn recent_history(&self, limit: usize) -> Result<Vec<HistoryRecord>, Error> {
        self.history.recent(limit).await
    }
}
