mod history;
mod location;
mod map;
mod route;

pub use history::{HistoryEntry, HistoryRecord};
pub use location::{Coordinates, LocationInput};
pub use map::MapArtifact;
pub use route::{RouteRequest, RouteResult, RouteSummary, TravelMode};
