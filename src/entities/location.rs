use geo_types::Point;
use serde::{Deserialize, Serialize};

use crate::error::{invalid_input_error, Error};

const MAX_INPUT_LEN: usize = 512;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    pub fn midpoint(&self, other: &Coordinates) -> Coordinates {
        ((Point::from(*self) + Point::from(*other)) / 2.0).into()
    }
}

impl From<Coordinates> for Point<f64> {
    fn from(coordinates: Coordinates) -> Self {
        Point::new(coordinates.lng, coordinates.lat)
    }
}

impl From<Point<f64>> for Coordinates {
    fn from(point: Point<f64>) -> Self {
        Coordinates {
            lat: point.y(),
            lng: point.x(),
        }
    }
}

/// A location as typed by the user, classified before any network call.
#[derive(Clone, Debug, PartialEq)]
pub enum LocationInput {
    Coordinates(Coordinates),
    Address(String),
}

impl LocationInput {
    pub fn parse(input: &str) -> Result<Self, Error> {
        let input = input.trim();

        if input.is_empty() {
            return Err(invalid_input_error("location must not be empty"));
        }

        if input.chars().count() > MAX_INPUT_LEN {
            return Err(invalid_input_error(format!(
                "location must be at most {} characters",
                MAX_INPUT_LEN
            )));
        }

        match parse_pair(input) {
            Some(coordinates) if coordinates.is_valid() => Ok(Self::Coordinates(coordinates)),
            Some(coordinates) => Err(invalid_input_error(format!(
                "coordinates out of range: {},{}",
                coordinates.lat, coordinates.lng
            ))),
            None => Ok(Self::Address(input.into())),
        }
    }
}

fn parse_pair(input: &str) -> Option<Coordinates> {
    let mut parts = input.split(',');
    let lat = parts.next()?.trim().parse::<f64>().ok()?;
    let lng = parts.next()?.trim().parse::<f64>().ok()?;

    if parts.next().is_some() || !lat.is_finite() || !lng.is_finite() {
        return None;
    }

    Some(Coordinates { lat, lng })
}

#[test]
fn parses_coordinate_pairs() {
    let input = LocationInput::parse(" 53.3498, -6.2603 ").unwrap();
    assert_eq!(
        input,
        LocationInput::Coordinates(Coordinates::new(53.3498, -6.2603))
    );
}

#[test]
fn treats_everything_else_as_address() {
    for raw in [
        "Trinity College, Dublin",
        "O'Connell Street",
        "1,2,3",
        "53.3,",
        "NaN,inf",
    ] {
        assert_eq!(
            LocationInput::parse(raw).unwrap(),
            LocationInput::Address(raw.trim().into()),
            "{}",
            raw
        );
    }
}

#[test]
fn rejects_empty_and_out_of_range_input() {
    use crate::error::Stage;

    for raw in ["", "   ", "91,0", "0,-180.5"] {
        let err = LocationInput::parse(raw).unwrap_err();
        assert_eq!(err.code, 100, "{}", raw);
        assert_eq!(err.stage, Some(Stage::ParsingInput));
    }

    let long = "a".repeat(MAX_INPUT_LEN + 1);
    assert!(LocationInput::parse(&long).is_err());
}

#[test]
fn midpoint_averages_both_axes() {
    let a = Coordinates::new(53.3498, -6.2603);
    let b = Coordinates::new(53.3441, -6.2600);
    let mid = a.midpoint(&b);

    assert!((mid.lat - 53.34695).abs() < 1e-9);
    assert!((mid.lng - -6.26015).abs() < 1e-9);
}
