use axum::{routing::get, Router};
use std::sync::Arc;

use crate::config::RedirectMode;
use crate::registry::LinkRegistry;

use super::handlers::{redirect_link, RedirectState};

pub fn create_redirect_router(registry: LinkRegistry, redirect_mode: RedirectMode) -> Router {
    let state = Arc::new(RedirectState {
        registry,
        redirect_mode,
    });

    Router::new()
        .route("/{code}", get(redirect_link))
        .with_state(state)
}
