//! Error types for the registry service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use aidreg_core::{Aid, CoreError, HeaderError};
use aidreg_store::StoreError;

/// Terminal outcomes of a rejected request.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Unparseable body, header or query.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Stated digest does not match the content.
    #[error("integrity failure: {0}")]
    IntegrityFailure(String),

    /// Missing, invalid or incomplete signature, or unknown identity.
    #[error("authentication failure: {0}")]
    AuthenticationFailure(String),

    /// No record matched the query.
    #[error("not found: {0}")]
    NotFound(String),

    /// Anything the requester cannot be blamed for.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::MalformedInput(_) | ServiceError::IntegrityFailure(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::AuthenticationFailure(_) => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ServiceError::MalformedInput(_) => "MALFORMED_INPUT",
            ServiceError::IntegrityFailure(_) => "INTEGRITY_FAILURE",
            ServiceError::AuthenticationFailure(_) => "AUTHENTICATION_FAILURE",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let message = match &self {
            ServiceError::MalformedInput(msg)
            | ServiceError::IntegrityFailure(msg)
            | ServiceError::AuthenticationFailure(msg)
            | ServiceError::NotFound(msg) => msg.clone(),
            ServiceError::Internal(msg) => {
                error!(error = %msg, "Internal error");
                "internal error".to_string()
            }
        };

        let body = ErrorResponse {
            error: message,
            code: self.code().to_string(),
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DigestMismatch(said) => {
                ServiceError::IntegrityFailure(format!("SAID mismatch: {}", said))
            }
            StoreError::Poisoned => ServiceError::Internal(err.to_string()),
        }
    }
}

impl From<SignError> for ServiceError {
    fn from(err: SignError) -> Self {
        ServiceError::Internal(format!("failed to sign response: {}", err))
    }
}

/// Identity resolution failures.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The identifier has no known key set.
    #[error("unknown identity: {0}")]
    UnknownIdentity(Aid),

    /// The resolver could not answer.
    #[error("resolver unavailable: {0}")]
    Unavailable(String),
}

/// Server signing failures.
#[derive(Debug, Error)]
pub enum SignError {
    #[error("signer has no keys")]
    NoKeys,

    #[error("signature header: {0}")]
    Header(#[from] HeaderError),

    #[error("encoding: {0}")]
    Encoding(#[from] CoreError),
}

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse identities file {path}: {reason}")]
    Identities { path: String, reason: String },
}
