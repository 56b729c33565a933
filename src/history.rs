use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::entities::{HistoryEntry, HistoryRecord};
use crate::error::Error;

/// Append-only log of completed route requests.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Appends the entry, stamped with a generated id and the current UTC time.
    async fn record(&self, entry: HistoryEntry) -> Result<Uuid, Error>;

    /// Up to `limit` records, most recent first.
    async fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>, Error>;
}

/// In-process history, used when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    records: RwLock<Vec<HistoryRecord>>,
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn record(&self, entry: HistoryEntry) -> Result<Uuid, Error> {
        let mut records = self.records.write().await;

        // stamped under the lock, so the log stays in timestamp order
        let record = HistoryRecord::new(entry);
        let id = record.id;
        records.push(record);

        Ok(id)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>, Error> {
        let records = self.records.read().await;

        Ok(records.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
fn entry(distance_m: u64) -> HistoryEntry {
    use crate::entities::Coordinates;

    HistoryEntry {
        origin_input: "53.3498,-6.2603".into(),
        destination_input: "53.3441,-6.2600".into(),
        origin: Coordinates::new(53.3498, -6.2603),
        destination: Coordinates::new(53.3441, -6.26),
        distance_m,
        duration: "180s".into(),
    }
}

#[test]
fn record_assigns_distinct_ids() {
    use tokio_test::block_on;

    let store = MemoryHistoryStore::default();

    let first = block_on(store.record(entry(1))).unwrap();
    let second = block_on(store.record(entry(2))).unwrap();

    assert_ne!(first, second);
}

#[test]
fn recent_is_bounded_and_newest_first() {
    use tokio_test::block_on;

    let store = MemoryHistoryStore::default();

    for distance in 0..5 {
        block_on(store.record(entry(distance))).unwrap();
    }

    let recent = block_on(store.recent(3)).unwrap();
    assert_eq!(recent.len(), 3);
    assert!(recent
        .windows(2)
        .all(|pair| pair[0].timestamp >= pair[1].timestamp));
    assert_eq!(
        recent.iter().map(|r| r.distance_m).collect::<Vec<_>>(),
        vec![4, 3, 2]
    );

    assert_eq!(block_on(store.recent(10)).unwrap().len(), 5);
    assert!(block_on(store.recent(0)).unwrap().is_empty());
}
