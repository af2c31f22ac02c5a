use axum::http::HeaderMap;

use crate::auth::{Claims, User};

pub const DEFAULT_CLAIMS_HEADER: &str = "x-authorizer-claims";

/// Source of the verified caller identity. Token verification happens
/// upstream; implementations only read what the gateway attached.
pub trait Authenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Option<Claims>;

    fn user(&self, headers: &HeaderMap) -> Option<User> {
        self.authenticate(headers)
            .and_then(|claims| User::from_claims(&claims))
    }
}

/// Reads a JSON claims object from a header set by the API gateway.
#[derive(Clone, Debug)]
pub struct ClaimsHeaderAuthenticator {
    header: String,
}

impl ClaimsHeaderAuthenticator {
    pub fn new(header: &str) -> Self {
        Self {
            header: header.to_ascii_lowercase(),
        }
    }
}

impl Default for ClaimsHeaderAuthenticator {
    fn default() -> Self {
        Self::new(DEFAULT_CLAIMS_HEADER)
    }
}

impl Authenticator for ClaimsHeaderAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Option<Claims> {
        let raw = headers.get(self.header.as_str())?.to_str().ok()?;

        match serde_json::from_str(raw) {
            Ok(claims) => Some(claims),
            Err(err) => {
                tracing::warn!("discarding unparseable authorizer claims: {}", err);
                None
            }
        }
    }
}

#[test]
fn reads_claims_from_header() {
    let mut headers = HeaderMap::new();
    headers.insert(
        DEFAULT_CLAIMS_HEADER,
        r#"{"cognito:username":"alice"}"#.parse().unwrap(),
    );

    let authenticator = ClaimsHeaderAuthenticator::default();

    assert_eq!(authenticator.user(&headers), User::new("alice"));
}

#[test]
fn custom_header_name_is_case_insensitive() {
    let mut headers = HeaderMap::new();
    headers.insert("x-claims", r#"{"cognito:username":"bob"}"#.parse().unwrap());

    let authenticator = ClaimsHeaderAuthenticator::new("X-Claims");

    assert_eq!(authenticator.user(&headers), User::new("bob"));
}

#[test]
fn missing_or_garbled_header_is_no_context() {
    let authenticator = ClaimsHeaderAuthenticator::default();
    assert!(authenticator.authenticate(&HeaderMap::new()).is_none());

    let mut headers = HeaderMap::new();
    headers.insert(DEFAULT_CLAIMS_HEADER, "not json".parse().unwrap());
    assert!(authenticator.authenticate(&headers).is_none());
}
