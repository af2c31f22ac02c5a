use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::db::RideStore;
use crate::engine::RideIdGenerator;
use crate::entities::{RideId, RideRecord, RIDE_ID_BYTES};
use crate::error::{storage_error, Error};

/// Store that fails every write and counts the attempts.
pub struct FailingRideStore {
    message: String,
    pub attempts: AtomicUsize,
}

impl FailingRideStore {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.into(),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RideStore for FailingRideStore {
    async fn put(&self, _record: &RideRecord) -> Result<(), Error> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(storage_error(&self.message))
    }
}

/// Hands out ids from a counter, so collisions are impossible to miss.
#[derive(Default)]
pub struct SequentialRideIds {
    next: Mutex<u128>,
}

impl RideIdGenerator for SequentialRideIds {
    fn generate(&self) -> RideId {
        let mut next = self.next.lock().unwrap();
        *next += 1;

        let bytes: [u8; RIDE_ID_BYTES] = next.to_be_bytes();
        RideId::from_bytes(bytes)
    }
}
