use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelMode {
    #[default]
    Drive,
    Bicycle,
    Walk,
    TwoWheeler,
    Transit,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteRequest {
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub travel_mode: TravelMode,
}

impl RouteRequest {
    pub fn new(origin: &str, destination: &str) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            travel_mode: TravelMode::default(),
        }
    }
}

/// A single route as returned by the routing provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub distance_m: u64,
    pub duration: String,
    pub encoded_polyline: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub distance_m: u64,
    pub duration: String,
    pub map_url: String,
}

#[test]
fn travel_mode_defaults_to_drive() {
    let request: RouteRequest =
        serde_json::from_str(r#"{"origin": "a", "destination": "b"}"#).unwrap();
    assert_eq!(request.travel_mode, TravelMode::Drive);

    let request: RouteRequest = serde_json::from_str(
        r#"{"origin": "a", "destination": "b", "travel_mode": "TWO_WHEELER"}"#,
    )
    .unwrap();
    assert_eq!(request.travel_mode, TravelMode::TwoWheeler);
}
