#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use wayfarer::artifacts::MapStore;
use wayfarer::engine::Engine;
use wayfarer::entities::{Coordinates, HistoryEntry, HistoryRecord, RouteResult, TravelMode};
use wayfarer::error::{
    not_found_error, resolution_unavailable_error, route_unavailable_error, unexpected_error,
    Error,
};
use wayfarer::external::{Geocoder, RouteProvider};
use wayfarer::history::{HistoryStore, MemoryHistoryStore};
use wayfarer::polyline;

pub const ORIGIN: &str = "53.3498,-6.2603";
pub const DESTINATION: &str = "53.3441,-6.2600";

/// Encoding of the two points above.
pub fn two_point_polyline() -> String {
    polyline::encode(&[
        Coordinates::new(53.3498, -6.2603),
        Coordinates::new(53.3441, -6.26),
    ])
}

pub fn dublin_route() -> RouteResult {
    RouteResult {
        distance_m: 1200,
        duration: "180s".into(),
        encoded_polyline: two_point_polyline(),
    }
}

#[derive(Default)]
pub struct StubGeocoder {
    places: HashMap<String, Coordinates>,
    calls: AtomicUsize,
}

impl StubGeocoder {
    pub fn with_place(mut self, address: &str, coordinates: Coordinates) -> Self {
        self.places.insert(address.into(), coordinates);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn geocode(&self, address: &str) -> Result<Vec<Coordinates>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        Ok(self.places.get(address).copied().into_iter().collect())
    }
}

/// Geocoder whose upstream always answers with `status`.
pub struct UnavailableGeocoder {
    pub status: u16,
}

#[async_trait]
impl Geocoder for UnavailableGeocoder {
    async fn geocode(&self, _address: &str) -> Result<Vec<Coordinates>, Error> {
        Err(resolution_unavailable_error(format!(
            "geocoding service responded with status {}",
            self.status
        ))
        .with_upstream(self.status, "{\"error_message\": \"backend error\"}".into()))
    }
}

pub enum RouteBehaviour {
    Routes(Vec<RouteResult>),
    UpstreamStatus(u16),
}

pub struct StubRoutes {
    behaviour: RouteBehaviour,
    calls: AtomicUsize,
}

impl StubRoutes {
    pub fn new(behaviour: RouteBehaviour) -> Self {
        Self {
            behaviour,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn returning(route: RouteResult) -> Self {
        Self::new(RouteBehaviour::Routes(vec![route]))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RouteProvider for StubRoutes {
    async fn compute_routes(
        &self,
        _origin: Coordinates,
        _destination: Coordinates,
        _travel_mode: TravelMode,
    ) -> Result<Vec<RouteResult>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behaviour {
            RouteBehaviour::Routes(routes) => Ok(routes.clone()),
            RouteBehaviour::UpstreamStatus(status) => Err(route_unavailable_error(format!(
                "routing service responded with status {}",
                status
            ))
            .with_upstream(*status, "{\"error\": {}}".into())),
        }
    }
}

#[derive(Default)]
pub struct MemoryMapStore {
    documents: Mutex<HashMap<Uuid, String>>,
    latest: Mutex<Option<Uuid>>,
}

impl MemoryMapStore {
    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }
}

#[async_trait]
impl MapStore for MemoryMapStore {
    async fn save(&self, id: Uuid, document: String) -> Result<(), Error> {
        self.documents.lock().unwrap().insert(id, document);
        *self.latest.lock().unwrap() = Some(id);

        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<String, Error> {
        self.documents
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(not_found_error)
    }

    async fn latest(&self) -> Option<Uuid> {
        *self.latest.lock().unwrap()
    }
}

pub struct FailingMapStore;

#[async_trait]
impl MapStore for FailingMapStore {
    async fn save(&self, _id: Uuid, _document: String) -> Result<(), Error> {
        Err(unexpected_error("disk full"))
    }

    async fn load(&self, _id: Uuid) -> Result<String, Error> {
        Err(not_found_error())
    }

    async fn latest(&self) -> Option<Uuid> {
        None
    }
}

#[derive(Default)]
pub struct FailingHistoryStore {
    attempts: AtomicUsize,
}

impl FailingHistoryStore {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistoryStore for FailingHistoryStore {
    async fn record(&self, _entry: HistoryEntry) -> Result<Uuid, Error> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        Err(unexpected_error("store unreachable"))
    }

    async fn recent(&self, _limit: usize) -> Result<Vec<HistoryRecord>, Error> {
        Ok(vec![])
    }
}

/// An engine wired to test doubles, with handles kept for inspection.
pub struct Harness {
    pub geocoder: Arc<StubGeocoder>,
    pub routes: Arc<StubRoutes>,
    pub maps: Arc<MemoryMapStore>,
    pub history: Arc<MemoryHistoryStore>,
}

impl Harness {
    pub fn new(geocoder: StubGeocoder, routes: StubRoutes) -> Self {
        Self {
            geocoder: Arc::new(geocoder),
            routes: Arc::new(routes),
            maps: Arc::new(MemoryMapStore::default()),
            history: Arc::new(MemoryHistoryStore::default()),
        }
    }

    pub fn engine(&self) -> Engine {
        Engine::new(
            self.geocoder.clone(),
            self.routes.clone(),
            self.maps.clone(),
            self.history.clone(),
        )
    }
}
