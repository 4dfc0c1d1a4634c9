use axum::extract::State;
use axum::Json;

use crate::state::AppState;

/// GET /api/templates — operational listing of the published registry.
pub async fn list_templates(State(app): State<AppState>) -> Json<serde_json::Value> {
    let registry = app.registry.current();

    let mut templates: Vec<(String, serde_json::Value)> = registry
        .templates()
        .map(|t| {
            let mut actions: Vec<&str> = t.actions.keys().map(String::as_str).collect();
            actions.sort_unstable();
            (
                t.template_id.clone(),
                serde_json::json!({
                    "templateId": t.template_id,
                    "label": t.label,
                    "category": t.category,
                    "actions": actions,
                }),
            )
        })
        .collect();
    templates.sort_by(|a, b| a.0.cmp(&b.0));

    let list: Vec<serde_json::Value> = templates.into_iter().map(|(_, v)| v).collect();
    Json(serde_json::json!(list))
}
