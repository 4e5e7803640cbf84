use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::config::RedirectMode;
use crate::registry::{LinkRegistry, RegistryError};

pub struct RedirectState {
    pub registry: LinkRegistry,
    pub redirect_mode: RedirectMode,
}

/// Redirect to the target URL, counting the click
pub async fn redirect_link(
    State(state): State<Arc<RedirectState>>,
    Path(code): Path<String>,
) -> Response {
    match state.registry.resolve(&code).await {
        Ok(target_url) => match HeaderValue::from_str(&target_url) {
            Ok(location) => (
                state.redirect_mode.status_code(),
                [(header::LOCATION, location)],
            )
                .into_response(),
            Err(err) => {
                tracing::warn!(short_code = %code, error = %err, "stored target is not a valid Location header");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        },
        Err(RegistryError::NotFound(_)) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response(),
    }
}
