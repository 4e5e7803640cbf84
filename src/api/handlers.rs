use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::models::{CreateLinkRequest, LinkRecord};
use crate::registry::{LinkRegistry, RegistryError};

pub struct AppState {
    pub registry: LinkRegistry,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub version: &'static str,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a registry failure to a status code and JSON error body.
pub fn error_response(err: RegistryError) -> ApiError {
    let status = match &err {
        RegistryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        RegistryError::AlreadyExists(_) => StatusCode::CONFLICT,
        RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
        RegistryError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    // Don't leak backend details to clients
    let error = if err.is_client_error() {
        err.to_string()
    } else {
        "Internal server error".to_string()
    };

    (status, Json(ErrorResponse { error }))
}

/// Create a new short link
pub async fn create_link(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkRecord>), ApiError> {
    state
        .registry
        .create_link(payload.code.as_deref(), payload.url.as_deref())
        .await
        .map(|link| (StatusCode::CREATED, Json(link)))
        .map_err(error_response)
}

/// List all links, most recent first
pub async fn list_links(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LinkRecord>>, ApiError> {
    state
        .registry
        .list_links()
        .await
        .map(Json)
        .map_err(error_response)
}

/// Get a link with its click statistics
pub async fn get_link(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<LinkRecord>, ApiError> {
    state
        .registry
        .get_link(&code)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn delete_link(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<OkResponse>, ApiError> {
    state
        .registry
        .delete_link(&code)
        .await
        .map(|()| Json(OkResponse { ok: true }))
        .map_err(error_response)
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}
