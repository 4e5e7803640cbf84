use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::FrontendConfig;
use crate::registry::LinkRegistry;

use super::handlers::{create_link, delete_link, get_link, health_check, list_links, AppState};
use super::static_files::dashboard_router;

pub fn create_api_router(registry: LinkRegistry, frontend: &FrontendConfig) -> Router {
    let state = Arc::new(AppState { registry });

    let api_routes = Router::new()
        .route("/links", post(create_link).get(list_links))
        .route("/links/{code}", get(get_link).delete(delete_link))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let router = Router::new()
        .route("/healthz", get(health_check))
        .nest("/api", api_routes);

    match frontend.static_dir.as_deref() {
        Some(dir) => router.merge(dashboard_router(dir)),
        None => router,
    }
}
