mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::*;
use wayfarer::entities::{HistoryRecord, RouteSummary};
use wayfarer::engine::Engine;
use wayfarer::history::MemoryHistoryStore;
use wayfarer::server::router;

fn test_app(harness: &Harness) -> Router {
    router(Arc::new(harness.engine()))
}

fn post_route(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/routes")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    hyper::body::to_bytes(response.into_body())
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn route_endpoint_returns_summary_and_map() {
    let harness = Harness::new(StubGeocoder::default(), StubRoutes::returning(dublin_route()));
    let app = test_app(&harness);

    let response = app
        .clone()
        .oneshot(post_route(json!({"origin": ORIGIN, "destination": DESTINATION})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let summary: RouteSummary = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(summary.distance_m, 1200);
    assert_eq!(summary.duration, "180s");

    let response = app.clone().oneshot(get(&summary.map_url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("L.polyline(path"));

    let response = app.oneshot(get("/map")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(String::from_utf8(body_bytes(response).await).unwrap(), html);
}

#[tokio::test]
async fn history_endpoint_lists_recent_requests() {
    let harness = Harness::new(StubGeocoder::default(), StubRoutes::returning(dublin_route()));
    let app = test_app(&harness);

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(post_route(json!({"origin": ORIGIN, "destination": DESTINATION})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.clone().oneshot(get("/history?limit=2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let records: Vec<HistoryRecord> = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(records.len(), 2);
    assert!(records[0].timestamp >= records[1].timestamp);

    let response = app.oneshot(get("/history")).await.unwrap();
    let records: Vec<Value> = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["origin"], json!({"lat": 53.3498, "lng": -6.2603}));
    assert_eq!(records[0]["distance_m"], 1200);
}

#[tokio::test]
async fn bad_input_is_a_client_error() {
    let harness = Harness::new(StubGeocoder::default(), StubRoutes::returning(dublin_route()));

    let response = test_app(&harness)
        .oneshot(post_route(json!({"origin": "", "destination": DESTINATION})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["stage"], "parsing_input");
    assert_eq!(body["code"], 100);
}

#[tokio::test]
async fn unresolvable_location_is_a_client_error() {
    let harness = Harness::new(StubGeocoder::default(), StubRoutes::returning(dublin_route()));

    let response = test_app(&harness)
        .oneshot(post_route(
            json!({"origin": "not a real place zzz123", "destination": DESTINATION}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["stage"], "resolving");
    assert_eq!(harness.routes.calls(), 0);
}

#[tokio::test]
async fn upstream_failure_is_a_bad_gateway_without_upstream_body() {
    let harness = Harness::new(
        StubGeocoder::default(),
        StubRoutes::new(RouteBehaviour::UpstreamStatus(503)),
    );

    let response = test_app(&harness)
        .oneshot(post_route(json!({"origin": ORIGIN, "destination": DESTINATION})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["stage"], "routing");
    assert_eq!(
        body["error"],
        "route unavailable: routing service responded with status 503"
    );
}

#[tokio::test]
async fn unknown_map_is_not_found() {
    let harness = Harness::new(StubGeocoder::default(), StubRoutes::returning(dublin_route()));
    let app = test_app(&harness);

    let response = app
        .clone()
        .oneshot(get(&format!("/maps/{}", uuid::Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/map")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn geocoder_outage_is_a_bad_gateway() {
    let routes = Arc::new(StubRoutes::returning(dublin_route()));
    let engine = Engine::new(
        Arc::new(UnavailableGeocoder { status: 503 }),
        routes.clone(),
        Arc::new(MemoryMapStore::default()),
        Arc::new(MemoryHistoryStore::default()),
    );

    let response = router(Arc::new(engine))
        .oneshot(post_route(
            json!({"origin": "Trinity College Dublin", "destination": DESTINATION}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["stage"], "resolving");
    assert_eq!(body["code"], 201);
    assert!(!body["error"].as_str().unwrap().contains("backend error"));
    assert_eq!(routes.calls(), 0);
}

async fn assert_parsing_input_error(response: axum::response::Response) {
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/json"));

    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["stage"], "parsing_input");
    assert_eq!(body["code"], 100);
}

#[tokio::test]
async fn malformed_route_requests_are_structured_client_errors() {
    let harness = Harness::new(StubGeocoder::default(), StubRoutes::returning(dublin_route()));
    let app = test_app(&harness);

    let response = app
        .clone()
        .oneshot(post_route(json!({"origin": "53.3,-6.2"})))
        .await
        .unwrap();
    assert_parsing_input_error(response).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/routes")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_parsing_input_error(response).await;

    let response = app
        .oneshot(post_route(
            json!({"origin": ORIGIN, "destination": DESTINATION, "travel_mode": "HOVERCRAFT"}),
        ))
        .await
        .unwrap();
    assert_parsing_input_error(response).await;

    assert_eq!(harness.routes.calls(), 0);
}

#[tokio::test]
async fn malformed_query_and_path_are_structured_client_errors() {
    let harness = Harness::new(StubGeocoder::default(), StubRoutes::returning(dublin_route()));
    let app = test_app(&harness);

    let response = app.clone().oneshot(get("/history?limit=abc")).await.unwrap();
    assert_parsing_input_error(response).await;

    let response = app.oneshot(get("/maps/not-a-uuid")).await.unwrap();
    assert_parsing_input_error(response).await;
}
