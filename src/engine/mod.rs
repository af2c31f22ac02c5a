mod dispatch;
mod driver_directory;
mod ride_api;
mod ride_id;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatch::{Dispatcher, RandomDispatcher, SeededSource, SelectionSource, ThreadRngSource};
pub use driver_directory::{DriverDirectory, StaticRoster};
pub use ride_id::{RideIdGenerator, SecureRideIdGenerator};

use std::sync::Arc;

use crate::{api::API, db::RideStore};

pub const DEFAULT_ETA: &str = "30 seconds";

type DynRideStore = Arc<dyn RideStore + Send + Sync>;

/// Stateless across requests: everything held here is read-only once built.
pub struct Engine {
    store: DynRideStore,
    dispatcher: Box<dyn Dispatcher + Send + Sync>,
    ride_ids: Box<dyn RideIdGenerator + Send + Sync>,
    eta: String,
}

impl Engine {
    pub fn new<D>(store: DynRideStore, dispatcher: D) -> Self
    where
        D: Dispatcher + Send + Sync + 'static,
    {
        Self {
            store,
            dispatcher: Box::new(dispatcher),
            ride_ids: Box::new(SecureRideIdGenerator),
            eta: DEFAULT_ETA.into(),
        }
    }

    pub fn with_ride_ids<G>(mut self, ride_ids: G) -> Self
    where
        G: RideIdGenerator + Send + Sync + 'static,
    {
        self.ride_ids = Box::new(ride_ids);
        self
    }

    pub fn with_eta(mut self, eta: &str) -> Self {
        self.eta = eta.into();
        self
    }
}

impl API for Engine {}
