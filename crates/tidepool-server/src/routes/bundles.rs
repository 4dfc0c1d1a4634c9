use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tidepool_core::theme::Bundle;
use tidepool_core::EngineError;

use crate::error::AppError;
use crate::state::AppState;

/// GET /themes/:theme_id/bundles/:bundle_id
pub async fn theme_bundle(
    State(app): State<AppState>,
    Path((theme_id, bundle_id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let registry = app.registry.current();
    let theme = registry
        .theme(&theme_id)
        .ok_or(EngineError::ThemeNotFound(theme_id))?;
    serve_bundle(theme.bundle(&bundle_id), bundle_id)
}

/// GET /templates/:template_id/bundles/:bundle_id
pub async fn template_bundle(
    State(app): State<AppState>,
    Path((template_id, bundle_id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let registry = app.registry.current();
    let template = registry
        .template(&template_id)
        .ok_or(EngineError::TemplateNotFound(template_id))?;
    serve_bundle(template.bundle(&bundle_id), bundle_id)
}

/// Write the bundle bytes verbatim with their metadata.
fn serve_bundle(bundle: Option<&Bundle>, bundle_id: String) -> Result<Response, AppError> {
    let bundle = bundle.ok_or(EngineError::BundleNotFound(bundle_id))?;

    Ok((
        [
            (header::CONTENT_TYPE, bundle.content_type.clone()),
            (header::CACHE_CONTROL, bundle.cache_control().to_string()),
        ],
        bundle.content.clone(),
    )
        .into_response())
}
