use axum::Router;
use std::path::Path;
use tower_http::services::ServeFile;

/// Dashboard pages served from `static_dir`:
/// `/` shows `index.html`, `/code/{code}` shows `stats.html`.
///
/// The pages fetch their data from the JSON API; the code in the path is read
/// client-side, so both routes serve a fixed file.
pub fn dashboard_router(static_dir: &str) -> Router {
    let dir = Path::new(static_dir);

    Router::new()
        .route_service("/", ServeFile::new(dir.join("index.html")))
        .route_service("/code/{code}", ServeFile::new(dir.join("stats.html")))
}
