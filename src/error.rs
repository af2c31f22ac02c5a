use axum::extract::Json;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::env;
use std::fmt::{self, Display};

pub const AUTHORIZATION_NOT_CONFIGURED: &str = "Authorization not configured";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    AuthorizationMissing,
    MalformedRequest,
    NoDriversAvailable,
    StorageFailure,
    Configuration,
}

impl ErrorKind {
    pub fn code(&self) -> i32 {
        match self {
            Self::Configuration => 1,
            Self::StorageFailure => 2,
            Self::NoDriversAvailable => 3,
            Self::AuthorizationMissing => 100,
            Self::MalformedRequest => 101,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::AuthorizationMissing => StatusCode::UNAUTHORIZED,
            Self::MalformedRequest => StatusCode::BAD_REQUEST,
            Self::NoDriversAvailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::StorageFailure | Self::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn code(&self) -> i32 {
        self.kind.code()
    }

    /// Converts the error into the JSON failure envelope, tagged with the
    /// correlation id the caller can quote back to an operator.
    pub fn into_response_with_reference(self, reference: &str) -> Response {
        let body = Json(ErrorEnvelope {
            error: self.message,
            reference: reference.into(),
        });

        let mut response = (self.kind.status(), body).into_response();
        response.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );

        response
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorEnvelope {
    pub error: String,
    pub reference: String,
}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        storage_error(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        malformed_request_error(err)
    }
}

pub fn authorization_missing_error() -> Error {
    Error {
        kind: ErrorKind::AuthorizationMissing,
        message: AUTHORIZATION_NOT_CONFIGURED.into(),
    }
}

pub fn malformed_request_error<T: Display>(err: T) -> Error {
    Error {
        kind: ErrorKind::MalformedRequest,
        message: err.to_string(),
    }
}

pub fn no_drivers_available_error() -> Error {
    Error {
        kind: ErrorKind::NoDriversAvailable,
        message: "no drivers available".into(),
    }
}

pub fn storage_error<T: Display>(err: T) -> Error {
    Error {
        kind: ErrorKind::StorageFailure,
        message: err.to_string(),
    }
}

pub fn env_var_error(err: env::VarError) -> Error {
    config_error(err)
}

pub fn config_error<T: Display>(err: T) -> Error {
    Error {
        kind: ErrorKind::Configuration,
        message: err.to_string(),
    }
}

#[test]
fn status_codes_are_distinct_per_kind() {
    assert_eq!(
        authorization_missing_error().kind.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        malformed_request_error("bad json").kind.status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        storage_error("throttled").kind.status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        no_drivers_available_error().kind.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[test]
fn storage_error_keeps_underlying_message() {
    let err = storage_error("ProvisionedThroughputExceededException");

    assert_eq!(err.kind, ErrorKind::StorageFailure);
    assert_eq!(err.message, "ProvisionedThroughputExceededException");
    assert_eq!(err.code(), 2);
}

#[test]
fn error_envelope_uses_wire_names() {
    let envelope = ErrorEnvelope {
        error: AUTHORIZATION_NOT_CONFIGURED.into(),
        reference: "req-1".into(),
    };

    let value = serde_json::to_value(&envelope).unwrap();

    assert_eq!(
        value,
        serde_json::json!({ "Error": "Authorization not configured", "Reference": "req-1" })
    );
}
