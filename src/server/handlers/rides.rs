use axum::body::Bytes;
use axum::extract::{Extension, Json};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::Instrument;
use uuid::Uuid;

use crate::server::{DynAPI, DynAuthenticator};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Extension(authenticator): Extension<DynAuthenticator>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let reference = request_reference(&headers);
    let span = tracing::info_span!("ride_request", request_id = %reference);

    let user = authenticator.user(&headers);

    match api.request_ride(user, &body).instrument(span).await {
        Ok(confirmation) => (
            StatusCode::CREATED,
            [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
            Json(confirmation),
        )
            .into_response(),
        Err(err) => err.into_response_with_reference(&reference),
    }
}

pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Authorization, Content-Type"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "OPTIONS, POST"),
        ],
        (),
    )
}

// caller or gateway supplied, otherwise minted here
fn request_reference(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[cfg(test)]
fn app(store: std::sync::Arc<dyn crate::db::RideStore + Send + Sync>) -> axum::Router {
    use crate::auth::ClaimsHeaderAuthenticator;
    use crate::engine::{Engine, RandomDispatcher, SeededSource, StaticRoster};

    let engine = Engine::new(
        store,
        RandomDispatcher::new(StaticRoster::default(), SeededSource::new(11)),
    );

    crate::server::router(engine, ClaimsHeaderAuthenticator::default())
}

#[cfg(test)]
fn post_ride(
    claims: Option<&str>,
    request_id: Option<&str>,
    body: &str,
) -> axum::http::Request<axum::body::Body> {
    use crate::auth::DEFAULT_CLAIMS_HEADER;

    let mut builder = axum::http::Request::builder()
        .method("POST")
        .uri("/ride")
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(claims) = claims {
        builder = builder.header(DEFAULT_CLAIMS_HEADER, claims);
    }
    if let Some(request_id) = request_id {
        builder = builder.header(REQUEST_ID_HEADER, request_id);
    }

    builder.body(axum::body::Body::from(body.to_string())).unwrap()
}

#[cfg(test)]
fn send(
    app: axum::Router,
    request: axum::http::Request<axum::body::Body>,
) -> (StatusCode, HeaderMap, serde_json::Value) {
    use tokio_test::block_on;
    use tower::ServiceExt;

    let response = block_on(app.oneshot(request)).unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = block_on(hyper::body::to_bytes(response.into_body())).unwrap();

    (status, headers, serde_json::from_slice(&bytes).unwrap())
}

#[cfg(test)]
const ALICE: &str = r#"{"cognito:username":"alice"}"#;

#[cfg(test)]
const PICKUP: &str = r#"{"PickupLocation":{"Latitude":47.61,"Longitude":-122.28}}"#;

#[test]
fn post_ride_returns_created() {
    use crate::db::MemoryRideStore;
    use crate::entities::{Driver, RideId};
    use std::sync::Arc;
    use tokio_test::block_on;

    let store = Arc::new(MemoryRideStore::new());
    let (status, headers, body) =
        send(app(store.clone()), post_ride(Some(ALICE), None, PICKUP));

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(body["Rider"], "alice");
    assert_eq!(body["Eta"], "30 seconds");

    let driver: Driver = serde_json::from_value(body["Unicorn"].clone()).unwrap();
    assert!(Driver::default_roster().contains(&driver));

    let ride_id: RideId = serde_json::from_value(body["RideId"].clone()).unwrap();
    let record = block_on(store.get(&ride_id)).unwrap();
    assert_eq!(record.driver, driver);
    assert_eq!(record.user, "alice");
}

#[test]
fn missing_claims_is_unauthorized() {
    use crate::db::MemoryRideStore;
    use std::sync::Arc;
    use tokio_test::block_on;

    let store = Arc::new(MemoryRideStore::new());
    let (status, headers, body) =
        send(app(store.clone()), post_ride(None, Some("req-123"), PICKUP));

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        body,
        serde_json::json!({ "Error": "Authorization not configured", "Reference": "req-123" })
    );
    assert_eq!(block_on(store.len()), 0);
}

#[test]
fn storage_failure_is_internal_error_with_reference() {
    use crate::engine::testing::FailingRideStore;
    use std::sync::Arc;

    let store = Arc::new(FailingRideStore::new("Rate exceeded"));
    let (status, headers, body) =
        send(app(store.clone()), post_ride(Some(ALICE), Some("req-456"), PICKUP));

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(body["Error"], "Rate exceeded");
    assert_eq!(body["Reference"], "req-456");
    assert_eq!(store.attempts(), 1);
}

#[test]
fn malformed_body_is_bad_request_with_minted_reference() {
    use crate::db::MemoryRideStore;
    use std::sync::Arc;

    let store = Arc::new(MemoryRideStore::new());
    let (status, _, body) = send(app(store), post_ride(Some(ALICE), None, "{\"Pickup"));

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body["Error"].as_str().unwrap().is_empty());
    assert!(Uuid::parse_str(body["Reference"].as_str().unwrap()).is_ok());
}

#[test]
fn preflight_allows_cross_origin_posts() {
    use crate::db::MemoryRideStore;
    use std::sync::Arc;
    use tokio_test::block_on;
    use tower::ServiceExt;

    let request = axum::http::Request::builder()
        .method("OPTIONS")
        .uri("/ride")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = block_on(app(Arc::new(MemoryRideStore::new())).oneshot(request)).unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS],
        "OPTIONS, POST"
    );
}
