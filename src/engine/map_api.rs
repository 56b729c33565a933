use super::Engine;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    api::MapAPI,
    entities::{Coordinates, MapArtifact},
    error::{not_found_error, Error, Stage},
    render,
};

impl Engine {
    /// Renders the route and stores it under a fresh id.
    #[tracing::instrument(skip(self, path), fields(points = path.len()))]
    pub async fn render_map(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        path: &[Coordinates],
    ) -> Result<MapArtifact, Error> {
        let document = render::map_document(origin, destination, path)?;
        let artifact = MapArtifact::new(Uuid::new_v4());

        self.maps
            .save(artifact.id, document)
            .await
            .map_err(|err| err.in_stage(Stage::Rendering))?;

        Ok(artifact)
    }
}

#[async_trait]
impl MapAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn find_map(&self, id: Uuid) -> Result<String, Error> {
        self.maps.load(id).await
    }

    #[tracing::instrument(skip(self))]
    async fn latest_map(&self) -> Result<String, Error> {
        let id = self.maps.latest().await.ok_or_else(not_found_error)?;

        self.maps.load(id).await
    }
}
