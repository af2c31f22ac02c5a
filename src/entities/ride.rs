use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::User;
use crate::entities::Driver;

pub const RIDE_ID_BYTES: usize = 16;

/// URL-safe base64 of 16 random bytes, unpadded.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RideId(String);

impl RideId {
    pub fn from_bytes(bytes: [u8; RIDE_ID_BYTES]) -> Self {
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn decode(&self) -> Option<[u8; RIDE_ID_BYTES]> {
        let bytes = URL_SAFE_NO_PAD.decode(&self.0).ok()?;
        bytes.try_into().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The row written to the ride store, once, keyed by `ride_id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RideRecord {
    pub ride_id: RideId,
    pub user: String,
    #[serde(rename = "Unicorn")]
    pub driver: Driver,
    pub request_time: DateTime<Utc>,
}

impl RideRecord {
    pub fn new(ride_id: RideId, user: &User, driver: Driver) -> Self {
        Self {
            ride_id,
            user: user.username.clone(),
            driver,
            request_time: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RideConfirmation {
    pub ride_id: RideId,
    #[serde(rename = "Unicorn")]
    pub driver: Driver,
    pub eta: String,
    pub rider: String,
}

impl RideConfirmation {
    pub fn from_record(record: &RideRecord, eta: &str) -> Self {
        Self {
            ride_id: record.ride_id.clone(),
            driver: record.driver.clone(),
            eta: eta.into(),
            rider: record.user.clone(),
        }
    }
}

#[test]
fn ride_id_is_url_safe_and_decodes_to_sixteen_bytes() {
    // 0xfb 0xff encode to "+/" in the standard alphabet
    let bytes = [0xfb, 0xff, 0xbf, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 0xfe, 0xff];
    let id = RideId::from_bytes(bytes);

    assert_eq!(id.as_str().len(), 22);
    assert!(!id.as_str().contains(|c| c == '+' || c == '/' || c == '='));
    assert_eq!(id.decode(), Some(bytes));
}

#[test]
fn ride_id_decode_rejects_wrong_length() {
    let id = RideId("AAAA".into());

    assert_eq!(id.decode(), None);
}

#[test]
fn record_and_confirmation_wire_format() {
    let user = User::new("alice").unwrap();
    let driver = Driver::new("Rocinante", "Yellow", "Female");
    let record = RideRecord::new(RideId::from_bytes([7; RIDE_ID_BYTES]), &user, driver);

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["User"], "alice");
    assert_eq!(value["Unicorn"]["Name"], "Rocinante");
    assert!(value["RequestTime"].as_str().unwrap().ends_with('Z'));

    let confirmation = RideConfirmation::from_record(&record, "30 seconds");
    let value = serde_json::to_value(&confirmation).unwrap();
    assert_eq!(value["RideId"], record.ride_id.as_str());
    assert_eq!(value["Rider"], "alice");
    assert_eq!(value["Eta"], "30 seconds");
    assert_eq!(value["Unicorn"]["Color"], "Yellow");
}
