pub mod google_maps;

use async_trait::async_trait;

use crate::entities::{Coordinates, RouteResult, TravelMode};
use crate::error::Error;

/// Address to coordinates. Zero results is `Ok(vec![])`, not an error.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Vec<Coordinates>, Error>;
}

/// Directions between two points. An empty list means no route was found.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn compute_routes(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        travel_mode: TravelMode,
    ) -> Result<Vec<RouteResult>, Error>;
}
