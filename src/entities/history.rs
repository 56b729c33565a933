use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Coordinates;

/// What the pipeline knows about a completed request before it is stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub origin_input: String,
    pub destination_input: String,
    pub origin: Coordinates,
    pub destination: Coordinates,
    pub distance_m: u64,
    pub duration: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: Uuid,
    pub origin_input: String,
    pub destination_input: String,
    pub origin: Coordinates,
    pub destination: Coordinates,
    pub distance_m: u64,
    pub duration: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryRecord {
    /// Stamps an entry with a fresh id and the current UTC time.
    pub fn new(entry: HistoryEntry) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin_input: entry.origin_input,
            destination_input: entry.destination_input,
            origin: entry.origin,
            destination: entry.destination,
            distance_m: entry.distance_m,
            duration: entry.duration,
            timestamp: Utc::now(),
        }
    }
}
