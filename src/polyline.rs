//! Encoded polyline format (precision 1e5).
//!
//! Each coordinate is stored as the zig-zagged delta from the previous point,
//! split into 5-bit groups, least significant first. A group with bit `0x20`
//! set is followed by another group of the same value. Every group is offset
//! by 63 so the result is printable ASCII (`?` through `~`).

use crate::entities::Coordinates;
use crate::error::{decode_error, Error};

const PRECISION: f64 = 1e5;
const OFFSET: u8 = 63;
const CONTINUATION: u64 = 0x20;
const GROUP_MASK: u64 = 0x1f;

/// Lazily decodes an encoded polyline, one point per item.
///
/// The first malformed value yields an `Err` and ends the iteration.
pub struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
    lat: i64,
    lng: i64,
    failed: bool,
}

impl<'a> Decoder<'a> {
    pub fn new(encoded: &'a str) -> Self {
        Self {
            bytes: encoded.as_bytes(),
            pos: 0,
            lat: 0,
            lng: 0,
            failed: false,
        }
    }

    fn next_point(&mut self) -> Result<Coordinates, Error> {
        let lat_delta = self.next_delta()?;

        if self.pos >= self.bytes.len() {
            return Err(decode_error(format!(
                "missing longitude after latitude ending at offset {}",
                self.pos
            )));
        }

        let lng_delta = self.next_delta()?;

        self.lat = self
            .lat
            .checked_add(lat_delta)
            .ok_or_else(|| decode_error("latitude overflow"))?;
        self.lng = self
            .lng
            .checked_add(lng_delta)
            .ok_or_else(|| decode_error("longitude overflow"))?;

        Ok(Coordinates {
            lat: self.lat as f64 / PRECISION,
            lng: self.lng as f64 / PRECISION,
        })
    }

    fn next_delta(&mut self) -> Result<i64, Error> {
        let start = self.pos;
        let mut result: u64 = 0;
        let mut shift: u32 = 0;

        loop {
            let byte = *self.bytes.get(self.pos).ok_or_else(|| {
                decode_error(format!("unterminated value starting at offset {}", start))
            })?;

            if !(OFFSET..=OFFSET + 63).contains(&byte) {
                return Err(decode_error(format!(
                    "invalid character {:?} at offset {}",
                    byte as char, self.pos
                )));
            }

            if shift >= 64 {
                return Err(decode_error(format!(
                    "value starting at offset {} does not fit in 64 bits",
                    start
                )));
            }

            let group = (byte - OFFSET) as u64;
            self.pos += 1;

            result |= (group & GROUP_MASK) << shift;
            shift += 5;

            if group & CONTINUATION == 0 {
                break;
            }
        }

        Ok(((result >> 1) as i64) ^ -((result & 1) as i64))
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = Result<Coordinates, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.bytes.len() {
            return None;
        }

        let point = self.next_point();
        self.failed = point.is_err();

        Some(point)
    }
}

/// Decodes the whole polyline, failing on the first malformed value.
pub fn decode(encoded: &str) -> Result<Vec<Coordinates>, Error> {
    Decoder::new(encoded).collect()
}

pub fn encode(points: &[Coordinates]) -> String {
    let mut encoded = String::new();
    let (mut prev_lat, mut prev_lng) = (0i64, 0i64);

    for point in points {
        let lat = (point.lat * PRECISION).round() as i64;
        let lng = (point.lng * PRECISION).round() as i64;

        encode_value(lat - prev_lat, &mut encoded);
        encode_value(lng - prev_lng, &mut encoded);

        prev_lat = lat;
        prev_lng = lng;
    }

    encoded
}

fn encode_value(delta: i64, out: &mut String) {
    let mut value = ((delta << 1) ^ (delta >> 63)) as u64;

    while value >= CONTINUATION {
        out.push((((value & GROUP_MASK) | CONTINUATION) as u8 + OFFSET) as char);
        value >>= 5;
    }

    out.push((value as u8 + OFFSET) as char);
}

#[cfg(test)]
fn assert_close(actual: &[Coordinates], expected: &[(f64, f64)]) {
    assert_eq!(actual.len(), expected.len());

    for (point, (lat, lng)) in actual.iter().zip(expected) {
        assert!((point.lat - lat).abs() < 1e-5, "{:?} vs {}", point, lat);
        assert!((point.lng - lng).abs() < 1e-5, "{:?} vs {}", point, lng);
    }
}

#[test]
fn decodes_reference_polyline() {
    let points = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();

    assert_close(
        &points,
        &[(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)],
    );
}

#[test]
fn empty_input_is_an_empty_path() {
    assert!(decode("").unwrap().is_empty());
}

#[test]
fn decoding_is_deterministic_and_lazy_matches_eager() {
    let encoded = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    let eager = decode(encoded).unwrap();
    let lazy: Vec<Coordinates> = Decoder::new(encoded).map(Result::unwrap).collect();

    assert_eq!(eager, decode(encoded).unwrap());
    assert_eq!(eager, lazy);
}

#[test]
fn round_trips_within_precision() {
    let original = [
        (53.3498, -6.2603),
        (53.3441, -6.26),
        (-33.86785, 151.20732),
        (0.0, 0.0),
        (89.99999, -179.99999),
        (-90.0, 180.0),
    ];
    let points: Vec<Coordinates> = original
        .iter()
        .map(|(lat, lng)| Coordinates::new(*lat, *lng))
        .collect();

    assert_close(&decode(&encode(&points)).unwrap(), &original);
}

#[test]
fn rejects_malformed_input() {
    use crate::error::Stage;

    // continuation bit set on the last character
    let unterminated = decode("_p~iF~ps|U_");
    // latitude without its longitude
    let premature = decode("_p~iF");
    // '!' is below the printable offset
    let invalid = decode("_p~iF!ps|U");
    let too_long = decode(&"~".repeat(20));

    for result in [unterminated, premature, invalid, too_long] {
        let err = result.unwrap_err();
        assert_eq!(err.code, 6);
        assert_eq!(err.stage, Some(Stage::Decoding));
    }
}

#[test]
fn decoder_stops_after_first_error() {
    let mut decoder = Decoder::new("_p~iF~ps|U_ulL");

    assert!(decoder.next().unwrap().is_ok());
    assert!(decoder.next().unwrap().is_err());
    assert!(decoder.next().is_none());
}
