//! Map documents: a self-contained Leaflet page with the route polyline and
//! origin/destination markers.

use serde_json::json;

use crate::entities::Coordinates;
use crate::error::{render_error, Error};

const TEMPLATE: &str = include_str!("map.html");
const INITIAL_ZOOM: u8 = 6;

pub fn map_document(
    origin: Coordinates,
    destination: Coordinates,
    path: &[Coordinates],
) -> Result<String, Error> {
    let center = origin.midpoint(&destination);
    let path: Vec<[f64; 2]> = path.iter().map(lat_lng).collect();

    let path = serde_json::to_string(&path).map_err(render_error)?;

    Ok(TEMPLATE
        .replace("__CENTER__", &json!(lat_lng(&center)).to_string())
        .replace("__ORIGIN__", &json!(lat_lng(&origin)).to_string())
        .replace("__DESTINATION__", &json!(lat_lng(&destination)).to_string())
        .replace("__PATH__", &path)
        .replace("__ZOOM__", &INITIAL_ZOOM.to_string()))
}

fn lat_lng(coordinates: &Coordinates) -> [f64; 2] {
    [coordinates.lat, coordinates.lng]
}

#[test]
fn document_embeds_markers_center_and_path() {
    let origin = Coordinates::new(53.3498, -6.2603);
    let destination = Coordinates::new(53.3441, -6.26);
    let path = vec![origin, Coordinates::new(53.347, -6.2601), destination];

    let html = map_document(origin, destination, &path).unwrap();

    assert!(html.contains("const origin = [53.3498,-6.2603];"));
    assert!(html.contains("const destination = [53.3441,-6.26];"));
    assert!(html.contains("const path = [[53.3498,-6.2603],[53.347,-6.2601],[53.3441,-6.26]];"));
    assert!(html.contains("const center = [53.34"));
    assert!(html.contains("setView(center, 6)"));
    assert!(!html.contains("__"));
}

#[test]
fn empty_path_still_renders_markers() {
    let origin = Coordinates::new(0.0, 0.0);

    let html = map_document(origin, origin, &[]).unwrap();

    assert!(html.contains("const path = [];"));
    assert!(html.contains("const origin = [0.0,0.0];"));
}
