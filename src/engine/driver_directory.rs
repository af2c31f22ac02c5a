use std::sync::Arc;

use crate::entities::Driver;

/// Where candidate drivers come from.
pub trait DriverDirectory {
    fn list_available(&self) -> Vec<Driver>;
}

/// Read-only roster fixed at startup.
#[derive(Clone, Debug)]
pub struct StaticRoster {
    drivers: Arc<[Driver]>,
}

impl StaticRoster {
    pub fn new(drivers: Vec<Driver>) -> Self {
        Self {
            drivers: drivers.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

impl Default for StaticRoster {
    fn default() -> Self {
        Self::new(Driver::default_roster())
    }
}

impl DriverDirectory for StaticRoster {
    fn list_available(&self) -> Vec<Driver> {
        self.drivers.to_vec()
    }
}

#[test]
fn default_roster_has_three_drivers() {
    let roster = StaticRoster::default();

    assert_eq!(roster.len(), 3);
    assert_eq!(roster.list_available()[1].name, "Shadowfax");
}
