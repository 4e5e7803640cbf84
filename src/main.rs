use anyhow::Result;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

use tinylink::config::Config;
use tinylink::registry::LinkRegistry;
use tinylink::{api, redirect};

#[tokio::main]
async fn main() -> Result<()> {
    tinylink::init_tracing();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // One store for the whole process, shared by every request
    let storage = config.open_storage().await?;
    info!("Database initialized successfully");

    let registry = LinkRegistry::new(storage.clone());

    if let Some(ref static_dir) = config.frontend.static_dir {
        info!("🎨 Serving dashboard from directory: {}", static_dir);
    }

    // The redirect catch-all is merged last; static API paths take precedence
    let app = api::create_api_router(registry.clone(), &config.frontend)
        .merge(redirect::create_redirect_router(
            registry,
            config.redirect_status,
        ))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 TinyLink server listening on http://{}", addr);
    info!("   - API endpoints available at http://{}/api/links", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, closing database connections...");
    storage.close().await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
