pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tidepool_core::registry::RegistryHandle;
use tidepool_core::store::MemoryStore;
use tidepool_core::{load, watch};
use tower_http::cors::{Any, CorsLayer};

/// Build the axum Router with all routes and middleware. Used by `serve()`
/// and available for integration testing.
pub fn build_router(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/streams/{token}/{action}",
            get(routes::streams::get_stream).post(routes::streams::post_stream),
        )
        .route(
            "/themes/{theme_id}/bundles/{bundle_id}",
            get(routes::bundles::theme_bundle),
        )
        .route(
            "/templates/{template_id}/bundles/{bundle_id}",
            get(routes::bundles::template_bundle),
        )
        .route("/api/templates", get(routes::templates::list_templates))
        .layer(cors)
        .with_state(app_state)
}

pub struct ServeOptions {
    pub templates_dir: PathBuf,
    pub themes_dir: Option<PathBuf>,
    pub port: u16,
    /// Republish template definitions when the source directories change.
    pub watch: bool,
}

/// Load the registry, start the reload watcher, and serve until shutdown.
pub async fn serve(options: ServeOptions, store: Arc<MemoryStore>) -> anyhow::Result<()> {
    let registry = load::load_registry(&options.templates_dir, options.themes_dir.as_deref())?;
    let handle = Arc::new(RegistryHandle::new(registry));

    if options.watch {
        watch::spawn(
            handle.clone(),
            options.templates_dir.clone(),
            options.themes_dir.clone(),
            watch::DEFAULT_POLL_INTERVAL,
        );
    }

    let app = build_router(state::AppState::new(handle, store));

    let addr = format!("0.0.0.0:{}", options.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("tidepool listening on http://localhost:{}", options.port);

    axum::serve(listener, app).await?;
    Ok(())
}
