mod history_api;
mod map_api;
mod resolver;
mod route_api;
mod route_fetcher;

use std::sync::Arc;

use crate::{
    api::API,
    artifacts::MapStore,
    external::{Geocoder, RouteProvider},
    history::HistoryStore,
};

/// Route planning pipeline. Every collaborator is injected, so each one can be
/// swapped for a test double.
pub struct Engine {
    geocoder: Arc<dyn Geocoder>,
    routes: Arc<dyn RouteProvider>,
    maps: Arc<dyn MapStore>,
    history: Arc<dyn HistoryStore>,
}

impl Engine {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        routes: Arc<dyn RouteProvider>,
        maps: Arc<dyn MapStore>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            geocoder,
            routes,
            maps,
            history,
        }
    }
}

impl API for Engine {}
