use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::DriverDirectory;
use crate::entities::{Coordinates, Driver};
use crate::error::{no_drivers_available_error, Error};

/// Picks the driver for a pickup. Matching policy lives entirely behind
/// this trait.
pub trait Dispatcher {
    fn select_driver(&self, pickup_location: &Coordinates) -> Result<Driver, Error>;
}

/// Index source for driver selection. Not security sensitive.
pub trait SelectionSource {
    /// Returns an index in `0..len`. `len` is never zero.
    fn choose(&self, len: usize) -> usize;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRngSource;

impl SelectionSource for ThreadRngSource {
    fn choose(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Reproducible selection, seeded once.
#[derive(Debug)]
pub struct SeededSource {
    rng: Mutex<StdRng>,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl SelectionSource for SeededSource {
    fn choose(&self, len: usize) -> usize {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        rng.gen_range(0..len)
    }
}

/// Uniform choice over the directory; ignores the pickup location.
pub struct RandomDispatcher {
    directory: Box<dyn DriverDirectory + Send + Sync>,
    source: Box<dyn SelectionSource + Send + Sync>,
}

impl RandomDispatcher {
    pub fn new<D, S>(directory: D, source: S) -> Self
    where
        D: DriverDirectory + Send + Sync + 'static,
        S: SelectionSource + Send + Sync + 'static,
    {
        Self {
            directory: Box::new(directory),
            source: Box::new(source),
        }
    }
}

impl Dispatcher for RandomDispatcher {
    #[tracing::instrument(skip(self))]
    fn select_driver(&self, pickup_location: &Coordinates) -> Result<Driver, Error> {
        let mut drivers = self.directory.list_available();

        if drivers.is_empty() {
            tracing::warn!("driver directory is empty, cannot dispatch");
            return Err(no_drivers_available_error());
        }

        let index = self.source.choose(drivers.len());

        Ok(drivers.swap_remove(index))
    }
}

#[cfg(test)]
const PICKUP: Coordinates = Coordinates {
    latitude: 47.61,
    longitude: -122.28,
};

#[test]
fn seeded_selection_is_reproducible() {
    use crate::engine::StaticRoster;

    let first = RandomDispatcher::new(StaticRoster::default(), SeededSource::new(7));
    let second = RandomDispatcher::new(StaticRoster::default(), SeededSource::new(7));

    for _ in 0..50 {
        assert_eq!(
            first.select_driver(&PICKUP).unwrap(),
            second.select_driver(&PICKUP).unwrap()
        );
    }
}

#[test]
fn selection_is_uniform_over_roster() {
    use crate::engine::StaticRoster;
    use std::collections::HashMap;

    let n = 30_000;
    let dispatcher = RandomDispatcher::new(StaticRoster::default(), ThreadRngSource);

    let mut counts: HashMap<String, usize> = HashMap::new();
    for _ in 0..n {
        let driver = dispatcher.select_driver(&PICKUP).unwrap();
        *counts.entry(driver.name).or_default() += 1;
    }

    assert_eq!(counts.len(), 3);
    for (name, count) in counts {
        // ~6 standard deviations
        assert!(
            count.abs_diff(n / 3) < 500,
            "{} selected {} times out of {}",
            name,
            count,
            n
        );
    }
}

#[test]
fn empty_directory_cannot_dispatch() {
    use crate::engine::StaticRoster;
    use crate::error::ErrorKind;

    let dispatcher = RandomDispatcher::new(StaticRoster::new(vec![]), ThreadRngSource);

    let err = dispatcher.select_driver(&PICKUP).unwrap_err();

    assert_eq!(err.kind, ErrorKind::NoDriversAvailable);
}
