use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::{
    entities::{Coordinates, RouteResult, TravelMode},
    error::{
        resolution_error, resolution_unavailable_error, route_unavailable_error, unexpected_error,
        Error,
    },
    external::{Geocoder, RouteProvider},
};

pub const DEFAULT_GEOCODING_API_BASE: &str = "https://maps.googleapis.com";
pub const DEFAULT_ROUTES_API_BASE: &str = "https://routes.googleapis.com";

const ROUTES_FIELD_MASK: &str =
    "routes.duration,routes.distanceMeters,routes.polyline.encodedPolyline";

#[derive(Clone)]
pub struct GoogleMapsConfig {
    pub api_key: String,
    pub geocoding_api_base: String,
    pub routes_api_base: String,
    pub timeout: Duration,
}

impl GoogleMapsConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            geocoding_api_base: DEFAULT_GEOCODING_API_BASE.into(),
            routes_api_base: DEFAULT_ROUTES_API_BASE.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl fmt::Debug for GoogleMapsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleMapsConfig")
            .field("api_key", &"<redacted>")
            .field("geocoding_api_base", &self.geocoding_api_base)
            .field("routes_api_base", &self.routes_api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Client for the Geocoding and Routes APIs.
///
/// One shared `reqwest::Client`; every call is bounded by `config.timeout`.
#[derive(Debug)]
pub struct GoogleMaps {
    config: GoogleMapsConfig,
    client: reqwest::Client,
}

impl GoogleMaps {
    pub fn new(config: GoogleMapsConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| unexpected_error(err.without_url()))?;

        Ok(Self { config, client })
    }
}

#[derive(Clone, Debug, Deserialize)]
struct Response<T> {
    status: String,
    results: Option<T>,
    error_message: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct Place {
    geometry: Geometry,
}

#[derive(Clone, Debug, Deserialize)]
struct Geometry {
    location: Coordinates,
}

#[async_trait]
impl Geocoder for GoogleMaps {
    #[tracing::instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Vec<Coordinates>, Error> {
        let url = format!("{}/maps/api/geocode/json", self.config.geocoding_api_base);

        let res = self
            .client
            .get(url)
            .query(&[("address", address)])
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|err| resolution_unavailable_error(err.without_url()))?;

        let status_code = res.status().as_u16();

        if !res.status().is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(status = status_code, %body, "geocoding request failed");

            return Err(resolution_unavailable_error(format!(
                "geocoding service responded with status {}",
                status_code
            ))
            .with_upstream(status_code, body));
        }

        let data: Response<Vec<Place>> = res
            .json()
            .await
            .map_err(|err| resolution_unavailable_error(err.without_url()))?;

        match data.status.as_str() {
            "OK" => Ok(data
                .results
                .unwrap_or_default()
                .into_iter()
                .map(|place| place.geometry.location)
                .collect()),
            "ZERO_RESULTS" => Ok(vec![]),
            "INVALID_REQUEST" => Err(resolution_error(format!(
                "geocoding rejected address {:?}",
                address
            ))),
            status => {
                tracing::warn!(
                    status,
                    error_message = data.error_message.as_deref().unwrap_or(""),
                    "geocoding rejected"
                );

                Err(resolution_unavailable_error(format!(
                    "geocoding failed with status {}",
                    status
                )))
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComputeRoutesRequest {
    origin: Waypoint,
    destination: Waypoint,
    travel_mode: TravelMode,
}

#[derive(Debug, Serialize)]
struct Waypoint {
    location: WaypointLocation,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WaypointLocation {
    lat_lng: LatLng,
}

#[derive(Debug, Serialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

impl From<Coordinates> for Waypoint {
    fn from(coordinates: Coordinates) -> Self {
        Waypoint {
            location: WaypointLocation {
                lat_lng: LatLng {
                    latitude: coordinates.lat,
                    longitude: coordinates.lng,
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ComputeRoutesResponse {
    #[serde(default)]
    routes: Vec<RouteDto>,
}

// Zero-valued fields are omitted by the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteDto {
    #[serde(default)]
    distance_meters: u64,
    #[serde(default)]
    duration: String,
    #[serde(default)]
    polyline: PolylineDto,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolylineDto {
    #[serde(default)]
    encoded_polyline: String,
}

impl From<RouteDto> for RouteResult {
    fn from(route: RouteDto) -> Self {
        RouteResult {
            distance_m: route.distance_meters,
            duration: route.duration,
            encoded_polyline: route.polyline.encoded_polyline,
        }
    }
}

#[async_trait]
impl RouteProvider for GoogleMaps {
    #[tracing::instrument(skip(self))]
    async fn compute_routes(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        travel_mode: TravelMode,
    ) -> Result<Vec<RouteResult>, Error> {
        let url = format!("{}/directions/v2:computeRoutes", self.config.routes_api_base);

        let body = ComputeRoutesRequest {
            origin: origin.into(),
            destination: destination.into(),
            travel_mode,
        };

        let res = self
            .client
            .post(url)
            .header("X-Goog-Api-Key", self.config.api_key.as_str())
            .header("X-Goog-FieldMask", ROUTES_FIELD_MASK)
            .json(&body)
            .send()
            .await
            .map_err(|err| route_unavailable_error(err.without_url()))?;

        let status_code = res.status().as_u16();
        let is_success = res.status().is_success();
        let text = res
            .text()
            .await
            .map_err(|err| route_unavailable_error(err.without_url()))?;

        tracing::debug!(status = status_code, body = %text, "routes response");

        if !is_success {
            tracing::warn!(status = status_code, body = %text, "routes request failed");

            return Err(route_unavailable_error(format!(
                "routing service responded with status {}",
                status_code
            ))
            .with_upstream(status_code, text));
        }

        let data: ComputeRoutesResponse = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(err) => {
                return Err(route_unavailable_error(format!(
                    "unreadable routing response: {}",
                    err
                ))
                .with_upstream(status_code, text))
            }
        };

        Ok(data.routes.into_iter().map(RouteResult::from).collect())
    }
}

#[test]
fn route_request_uses_lat_lng_waypoints() {
    let body = ComputeRoutesRequest {
        origin: Coordinates::new(53.3498, -6.2603).into(),
        destination: Coordinates::new(53.3441, -6.26).into(),
        travel_mode: TravelMode::Drive,
    };

    assert_eq!(
        serde_json::to_value(&body).unwrap(),
        serde_json::json!({
            "origin": {"location": {"latLng": {"latitude": 53.3498, "longitude": -6.2603}}},
            "destination": {"location": {"latLng": {"latitude": 53.3441, "longitude": -6.26}}},
            "travelMode": "DRIVE",
        })
    );
}

#[test]
fn route_response_tolerates_omitted_fields() {
    let data: ComputeRoutesResponse = serde_json::from_str(
        r#"{"routes": [{"duration": "0s", "polyline": {"encodedPolyline": "??"}}]}"#,
    )
    .unwrap();
    let routes: Vec<RouteResult> = data.routes.into_iter().map(RouteResult::from).collect();

    assert_eq!(
        routes,
        vec![RouteResult {
            distance_m: 0,
            duration: "0s".into(),
            encoded_polyline: "??".into(),
        }]
    );

    let empty: ComputeRoutesResponse = serde_json::from_str("{}").unwrap();
    assert!(empty.routes.is_empty());
}

#[test]
fn config_debug_redacts_api_key() {
    let config = GoogleMapsConfig::new("secret-key".into());

    assert!(!format!("{:?}", config).contains("secret-key"));
}
