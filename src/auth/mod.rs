mod authenticator;
mod user;

pub use authenticator::{Authenticator, ClaimsHeaderAuthenticator, DEFAULT_CLAIMS_HEADER};
pub use user::{Claims, User, USERNAME_CLAIM};
