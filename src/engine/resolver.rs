use super::Engine;

use crate::{
    entities::{Coordinates, LocationInput},
    error::{resolution_error, Error, Stage},
};

impl Engine {
    /// Parses and resolves a raw location string. Malformed input fails
    /// before any geocoding call.
    pub async fn resolve(&self, input: &str) -> Result<Coordinates, Error> {
        let input = LocationInput::parse(input)?;

        self.resolve_input(input).await
    }

    /// Coordinates pass straight through; addresses go to the geocoder and
    /// resolve to its first result.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_input(&self, input: LocationInput) -> Result<Coordinates, Error> {
        let address = match input {
            LocationInput::Coordinates(coordinates) => return Ok(coordinates),
            LocationInput::Address(address) => address,
        };

        let results = self
            .geocoder
            .geocode(&address)
            .await
            .map_err(|err| err.in_stage(Stage::Resolving))?;

        let coordinates = results
            .into_iter()
            .next()
            .ok_or_else(|| resolution_error(format!("no results for {:?}", address)))?;

        if !coordinates.is_valid() {
            return Err(resolution_error(format!(
                "geocoder returned out-of-range coordinates for {:?}",
                address
            )));
        }

        tracing::debug!(lat = coordinates.lat, lng = coordinates.lng, "geocoded");

        Ok(coordinates)
    }
}
