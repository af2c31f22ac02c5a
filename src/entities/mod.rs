mod driver;
mod location;
mod ride;

pub use driver::Driver;
pub use location::{Coordinates, RideRequest};
pub use ride::{RideConfirmation, RideId, RideRecord, RIDE_ID_BYTES};
