use async_trait::async_trait;

use crate::auth::User;
use crate::entities::RideConfirmation;
use crate::error::Error;

#[async_trait]
pub trait RideAPI {
    /// Assigns a driver to the caller and records the ride. `user` is `None`
    /// when no authorization context reached the service; `body` is the raw
    /// request payload.
    async fn request_ride(
        &self,
        user: Option<User>,
        body: &[u8],
    ) -> Result<RideConfirmation, Error>;
}

pub trait API: RideAPI {}
