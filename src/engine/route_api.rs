use super::Engine;

use async_trait::async_trait;

use crate::{
    api::RouteAPI,
    entities::{HistoryEntry, RouteRequest, RouteSummary},
    error::{Error, Stage},
    polyline,
};

impl Engine {
    // parse -> resolve -> route -> decode -> render -> record.
    // Any stage but recording stops the run with its own error.
    async fn run_pipeline(&self, request: RouteRequest) -> Result<RouteSummary, Error> {
        tracing::info!(stage = %Stage::Resolving, "resolving locations");
        let (origin, destination) = futures::try_join!(
            self.resolve(&request.origin),
            self.resolve(&request.destination)
        )?;

        tracing::info!(stage = %Stage::Routing, "fetching route");
        let route = self
            .fetch_route(origin, destination, request.travel_mode)
            .await?;

        tracing::info!(stage = %Stage::Decoding, "decoding path");
        let path = polyline::decode(&route.encoded_polyline)?;

        tracing::info!(stage = %Stage::Rendering, points = path.len(), "rendering map");
        let map = self.render_map(origin, destination, &path).await?;

        tracing::info!(stage = %Stage::Recording, "recording history");
        self.record_history(HistoryEntry {
            origin_input: request.origin,
            destination_input: request.destination,
            origin,
            destination,
            distance_m: route.distance_m,
            duration: route.duration.clone(),
        })
        .await;

        Ok(RouteSummary {
            distance_m: route.distance_m,
            duration: route.duration,
            map_url: map.url,
        })
    }
}

#[async_trait]
impl RouteAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn plan_route(&self, request: RouteRequest) -> Result<RouteSummary, Error> {
        match self.run_pipeline(request).await {
            Ok(summary) => {
                tracing::info!(map_url = %summary.map_url, "route planned");
                Ok(summary)
            }
            Err(err) => {
                tracing::warn!("route planning failed: {}", err);
                Err(err)
            }
        }
    }
}
