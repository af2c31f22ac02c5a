use super::Engine;

use async_trait::async_trait;

use crate::{
    api::RideAPI,
    auth::User,
    entities::{RideConfirmation, RideRecord, RideRequest},
    error::{authorization_missing_error, Error},
};

#[async_trait]
impl RideAPI for Engine {
    #[tracing::instrument(skip(self, body))]
    async fn request_ride(
        &self,
        user: Option<User>,
        body: &[u8],
    ) -> Result<RideConfirmation, Error> {
        let user = user.ok_or_else(|| {
            tracing::warn!("no authorization context, rejecting ride request");
            authorization_missing_error()
        })?;

        let ride_id = self.ride_ids.generate();

        let request = RideRequest::parse(body).map_err(|err| {
            tracing::warn!("malformed ride request: {}", err.message);
            err
        })?;

        let driver = self.dispatcher.select_driver(&request.pickup_location)?;

        tracing::info!(
            "selected {} for ride {} at ({}, {})",
            driver.name,
            ride_id,
            request.pickup_location.latitude,
            request.pickup_location.longitude
        );

        let record = RideRecord::new(ride_id, &user, driver);

        // single write, never retried here
        if let Err(err) = self.store.put(&record).await {
            tracing::error!("failed to record ride {}: {}", record.ride_id, err.message);
            return Err(err);
        }

        tracing::info!("recorded ride {}", record.ride_id);

        Ok(RideConfirmation::from_record(&record, &self.eta))
    }
}

#[cfg(test)]
const ALICE_BODY: &[u8] = br#"{"PickupLocation":{"Latitude":47.61,"Longitude":-122.28}}"#;

#[cfg(test)]
fn memory_engine(seed: u64) -> (std::sync::Arc<crate::db::MemoryRideStore>, Engine) {
    use crate::db::MemoryRideStore;
    use crate::engine::{RandomDispatcher, SeededSource, StaticRoster};
    use std::sync::Arc;

    let store = Arc::new(MemoryRideStore::new());
    let engine = Engine::new(
        store.clone(),
        RandomDispatcher::new(StaticRoster::default(), SeededSource::new(seed)),
    );

    (store, engine)
}

#[test]
fn alice_gets_a_unicorn_from_the_roster() {
    use crate::entities::Driver;
    use tokio_test::block_on;

    let (_, engine) = memory_engine(1);

    let confirmation = block_on(engine.request_ride(User::new("alice"), ALICE_BODY)).unwrap();

    assert_eq!(confirmation.rider, "alice");
    assert_eq!(confirmation.eta, "30 seconds");
    assert!(Driver::default_roster().contains(&confirmation.driver));
    assert!(!confirmation
        .ride_id
        .as_str()
        .contains(|c| c == '+' || c == '/' || c == '='));
    assert_eq!(confirmation.ride_id.decode().map(|b| b.len()), Some(16));
}

#[test]
fn confirmation_matches_persisted_record() {
    use tokio_test::block_on;

    let (store, engine) = memory_engine(2);

    for _ in 0..20 {
        let confirmation =
            block_on(engine.request_ride(User::new("alice"), ALICE_BODY)).unwrap();
        let record = block_on(store.get(&confirmation.ride_id)).unwrap();

        assert_eq!(record.ride_id, confirmation.ride_id);
        assert_eq!(record.driver, confirmation.driver);
        assert_eq!(record.user, confirmation.rider);
    }

    assert_eq!(block_on(store.len()), 20);
}

#[test]
fn missing_authorization_is_rejected_before_anything_else() {
    use crate::engine::testing::FailingRideStore;
    use crate::engine::{RandomDispatcher, StaticRoster, ThreadRngSource};
    use crate::error::{ErrorKind, AUTHORIZATION_NOT_CONFIGURED};
    use std::sync::Arc;
    use tokio_test::block_on;

    let store = Arc::new(FailingRideStore::new("unreachable"));
    let engine = Engine::new(
        store.clone(),
        RandomDispatcher::new(StaticRoster::default(), ThreadRngSource),
    );

    // body is garbage too; the auth failure must win
    let err = block_on(engine.request_ride(None, b"not json")).unwrap_err();

    assert_eq!(err.kind, ErrorKind::AuthorizationMissing);
    assert_eq!(err.message, AUTHORIZATION_NOT_CONFIGURED);
    assert_eq!(store.attempts(), 0);
}

#[test]
fn storage_failure_is_surfaced_without_retry() {
    use crate::engine::testing::FailingRideStore;
    use crate::engine::{RandomDispatcher, StaticRoster, ThreadRngSource};
    use crate::error::ErrorKind;
    use std::sync::Arc;
    use tokio_test::block_on;

    let store = Arc::new(FailingRideStore::new("Requested resource not found"));
    let engine = Engine::new(
        store.clone(),
        RandomDispatcher::new(StaticRoster::default(), ThreadRngSource),
    );

    let err = block_on(engine.request_ride(User::new("alice"), ALICE_BODY)).unwrap_err();

    assert_eq!(err.kind, ErrorKind::StorageFailure);
    assert_eq!(err.message, "Requested resource not found");
    assert_eq!(store.attempts(), 1);
}

#[test]
fn malformed_body_writes_nothing() {
    use crate::error::ErrorKind;
    use tokio_test::block_on;

    let (store, engine) = memory_engine(3);

    for body in [
        &b"{"[..],
        &br#"{"PickupLocation":{"Latitude":"north"}}"#[..],
        &b"[]"[..],
    ] {
        let err = block_on(engine.request_ride(User::new("alice"), body)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedRequest);
    }

    assert_eq!(block_on(store.len()), 0);
}

#[test]
fn empty_roster_writes_nothing() {
    use crate::db::MemoryRideStore;
    use crate::engine::{RandomDispatcher, StaticRoster, ThreadRngSource};
    use crate::error::ErrorKind;
    use std::sync::Arc;
    use tokio_test::block_on;

    let store = Arc::new(MemoryRideStore::new());
    let engine = Engine::new(
        store.clone(),
        RandomDispatcher::new(StaticRoster::new(vec![]), ThreadRngSource),
    );

    let err = block_on(engine.request_ride(User::new("alice"), ALICE_BODY)).unwrap_err();

    assert_eq!(err.kind, ErrorKind::NoDriversAvailable);
    assert_eq!(block_on(store.len()), 0);
}

#[test]
fn ride_ids_are_unique_across_requests() {
    use std::collections::HashSet;
    use tokio_test::block_on;

    let (store, engine) = memory_engine(4);

    let ids: HashSet<_> = (0..10_000)
        .map(|_| {
            block_on(engine.request_ride(User::new("alice"), ALICE_BODY))
                .unwrap()
                .ride_id
        })
        .collect();

    assert_eq!(ids.len(), 10_000);
    assert_eq!(block_on(store.len()), 10_000);
}

#[test]
fn selection_through_the_handler_is_uniform() {
    use std::collections::HashMap;
    use tokio_test::block_on;

    let n = 12_000;
    let (_, engine) = memory_engine(5);

    let mut counts: HashMap<String, usize> = HashMap::new();
    for _ in 0..n {
        let confirmation =
            block_on(engine.request_ride(User::new("alice"), ALICE_BODY)).unwrap();
        *counts.entry(confirmation.driver.name).or_default() += 1;
    }

    assert_eq!(counts.len(), 3);
    for count in counts.values() {
        assert!(count.abs_diff(n / 3) < 400, "{:?}", counts);
    }
}

#[test]
fn dispatcher_and_ids_can_be_substituted() {
    use crate::db::MemoryRideStore;
    use crate::engine::testing::SequentialRideIds;
    use crate::engine::Dispatcher;
    use crate::entities::{Coordinates, Driver};
    use std::sync::Arc;
    use tokio_test::block_on;

    struct Nearest;

    impl Dispatcher for Nearest {
        fn select_driver(&self, pickup_location: &Coordinates) -> Result<Driver, Error> {
            let name = if pickup_location.latitude > 0.0 {
                "North"
            } else {
                "South"
            };
            Ok(Driver::new(name, "Grey", "Female"))
        }
    }

    let store = Arc::new(MemoryRideStore::new());
    let engine = Engine::new(store.clone(), Nearest)
        .with_ride_ids(SequentialRideIds::default())
        .with_eta("2 minutes");

    let north = block_on(engine.request_ride(User::new("bob"), ALICE_BODY)).unwrap();
    let south = block_on(engine.request_ride(
        User::new("bob"),
        br#"{"PickupLocation":{"Latitude":-33.86,"Longitude":151.21}}"#,
    ))
    .unwrap();

    assert_eq!(north.driver.name, "North");
    assert_eq!(south.driver.name, "South");
    assert_eq!(north.eta, "2 minutes");
    assert_ne!(north.ride_id, south.ride_id);
    assert_eq!(block_on(store.len()), 2);
}
