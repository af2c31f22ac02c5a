use serde::{Deserialize, Serialize};

use crate::error::{malformed_request_error, Error};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Body of `POST /ride`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RideRequest {
    pub pickup_location: Coordinates,
}

impl RideRequest {
    // coordinates are accepted unchecked, out of range values pass through
    pub fn parse(body: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(body).map_err(malformed_request_error)
    }
}

#[test]
fn parse_ride_request() {
    let request =
        RideRequest::parse(br#"{"PickupLocation":{"Latitude":47.61,"Longitude":-122.28}}"#)
            .unwrap();

    assert_eq!(request.pickup_location.latitude, 47.61);
    assert_eq!(request.pickup_location.longitude, -122.28);
}

#[test]
fn parse_rejects_invalid_json() {
    let err = RideRequest::parse(b"{\"PickupLocation\":").unwrap_err();

    assert_eq!(err.kind, crate::error::ErrorKind::MalformedRequest);
}

#[test]
fn parse_rejects_missing_pickup_location() {
    let err = RideRequest::parse(br#"{"Dropoff":{"Latitude":1.0,"Longitude":2.0}}"#).unwrap_err();

    assert_eq!(err.kind, crate::error::ErrorKind::MalformedRequest);
    assert!(err.message.contains("PickupLocation"));
}

#[test]
fn parse_accepts_out_of_range_coordinates() {
    let request =
        RideRequest::parse(br#"{"PickupLocation":{"Latitude":123.0,"Longitude":-500.0}}"#)
            .unwrap();

    assert_eq!(request.pickup_location.latitude, 123.0);
}
