use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapArtifact {
    pub id: Uuid,
    pub url: String,
}

impl MapArtifact {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            url: format!("/maps/{}", id),
        }
    }
}
