use super::Engine;

use crate::{
    entities::{Coordinates, RouteResult, TravelMode},
    error::{route_unavailable_error, Error, Stage},
};

impl Engine {
    /// One call to the routing provider, never retried. The first route wins.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        travel_mode: TravelMode,
    ) -> Result<RouteResult, Error> {
        let routes = self
            .routes
            .compute_routes(origin, destination, travel_mode)
            .await
            .map_err(|err| err.in_stage(Stage::Routing))?;

        let route = routes
            .into_iter()
            .next()
            .ok_or_else(|| route_unavailable_error("no route between origin and destination"))?;

        tracing::debug!(
            distance_m = route.distance_m,
            duration = %route.duration,
            "route fetched"
        );

        Ok(route)
    }
}
