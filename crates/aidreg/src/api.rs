//! HTTP surface of the registry.
//!
//! Handlers only pull raw bytes and headers off the request and hand them to
//! [`RegistryService`]; every protocol decision is made there.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use aidreg_core::SIGNATURE_HEADER;

use crate::error::ServiceError;
use crate::service::{RegistryService, Signed};

/// Header naming the requester when the signature bundle does not.
pub const AID_HEADER: &str = "KERI-AID";

/// Shared application state.
pub struct AppState {
    pub service: RegistryService,
}

impl AppState {
    pub fn new(service: RegistryService) -> Self {
        Self { service }
    }
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Readiness check response
#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub server_aid: String,
    pub records: usize,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// GET /ready
pub async fn ready(State(state): State<Arc<AppState>>) -> Result<Json<ReadyResponse>, ServiceError> {
    let records = state.service.registry().len().await?;

    Ok(Json(ReadyResponse {
        ready: true,
        server_aid: state.service.server_aid().to_string(),
        records,
    }))
}

/// POST /register
///
/// Body: the record as JSON. `Signature` covers the raw body bytes.
pub async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ServiceError> {
    let signature = header_bytes(&headers, SIGNATURE_HEADER);
    let signed = state.service.register(&body, signature).await?;
    Ok(signed_response(StatusCode::CREATED, signed))
}

/// GET /read?SAID=..|AID=..|name=..
///
/// `Signature` covers the raw query string, exactly as sent.
pub async fn read(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, ServiceError> {
    let signature = header_bytes(&headers, SIGNATURE_HEADER);
    let claimed = header_bytes(&headers, AID_HEADER);
    let signed = state.service.read(uri.query(), signature, claimed).await?;
    Ok(signed_response(StatusCode::OK, signed))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/register", post(register))
        .route("/read", get(read))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn header_bytes<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a [u8]> {
    headers.get(name).map(HeaderValue::as_bytes)
}

fn signed_response<T: Serialize>(status: StatusCode, signed: Signed<T>) -> Response {
    (
        status,
        [(SIGNATURE_HEADER, signed.signature)],
        Json(signed.body),
    )
        .into_response()
}
