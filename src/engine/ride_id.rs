use rand::rngs::OsRng;
use rand::RngCore;

use crate::entities::{RideId, RIDE_ID_BYTES};

/// Source of fresh ride ids. Ids must be unpredictable, so implementations
/// draw from a cryptographically secure generator.
pub trait RideIdGenerator {
    fn generate(&self) -> RideId;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SecureRideIdGenerator;

impl RideIdGenerator for SecureRideIdGenerator {
    fn generate(&self) -> RideId {
        let mut bytes = [0u8; RIDE_ID_BYTES];
        OsRng.fill_bytes(&mut bytes);

        RideId::from_bytes(bytes)
    }
}

#[test]
fn generated_ids_are_url_safe() {
    let id = SecureRideIdGenerator.generate();

    assert!(!id.as_str().is_empty());
    assert!(id
        .as_str()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    assert!(id.decode().is_some());
}

#[test]
fn generated_ids_do_not_collide() {
    use std::collections::HashSet;

    let generator = SecureRideIdGenerator;
    let ids: HashSet<RideId> = (0..100_000).map(|_| generator.generate()).collect();

    assert_eq!(ids.len(), 100_000);
}
