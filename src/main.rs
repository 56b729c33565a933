use std::sync::Arc;

use wayfarer::artifacts::{spawn_purge_task, FsMapStore};
use wayfarer::config::Config;
use wayfarer::db::PgHistoryStore;
use wayfarer::engine::Engine;
use wayfarer::error::Error;
use wayfarer::external::google_maps::GoogleMaps;
use wayfarer::history::{HistoryStore, MemoryHistoryStore};
use wayfarer::server::serve;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    tracing::debug!(google_maps = ?config.google_maps, map_dir = %config.map_dir.display(), "configuration loaded");

    let google_maps = Arc::new(GoogleMaps::new(config.google_maps.clone())?);

    let maps = Arc::new(FsMapStore::new(&config.map_dir).await?);
    spawn_purge_task(maps.clone(), config.map_retention);

    let history: Arc<dyn HistoryStore> = match &config.database_url {
        Some(url) => Arc::new(PgHistoryStore::new(url, config.database_max_connections).await?),
        None => {
            tracing::warn!("DATABASE_URL not set, route history will not survive a restart");
            Arc::new(MemoryHistoryStore::default())
        }
    };

    let engine = Engine::new(google_maps.clone(), google_maps, maps, history);

    serve(engine, config.listen_addr).await
}
