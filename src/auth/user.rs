use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const USERNAME_CLAIM: &str = "cognito:username";

/// Claims injected by the identity provider after it verified the caller.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(HashMap<String, serde_json::Value>);

impl Claims {
    pub fn username(&self) -> Option<&str> {
        self.0.get(USERNAME_CLAIM).and_then(|value| value.as_str())
    }
}

impl From<HashMap<String, serde_json::Value>> for Claims {
    fn from(claims: HashMap<String, serde_json::Value>) -> Self {
        Self(claims)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
}

impl User {
    pub fn new(username: &str) -> Option<Self> {
        if username.is_empty() {
            return None;
        }

        Some(Self {
            username: username.into(),
        })
    }

    pub fn from_claims(claims: &Claims) -> Option<Self> {
        claims.username().and_then(User::new)
    }
}

#[test]
fn user_from_claims() {
    let claims: Claims = serde_json::from_str(
        r#"{"cognito:username":"alice","email":"alice@example.com","email_verified":"true"}"#,
    )
    .unwrap();

    assert_eq!(User::from_claims(&claims), User::new("alice"));
}

#[test]
fn empty_or_missing_username_is_no_user() {
    let claims: Claims = serde_json::from_str(r#"{"cognito:username":""}"#).unwrap();
    assert_eq!(User::from_claims(&claims), None);

    let claims: Claims = serde_json::from_str(r#"{"sub":"1234"}"#).unwrap();
    assert_eq!(User::from_claims(&claims), None);

    let claims: Claims = serde_json::from_str(r#"{"cognito:username":42}"#).unwrap();
    assert_eq!(User::from_claims(&claims), None);
}
