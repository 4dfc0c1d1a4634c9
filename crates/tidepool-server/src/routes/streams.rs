use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use std::collections::HashMap;
use tidepool_core::pipeline::{Method, Pipeline, StepContext};
use tidepool_core::EngineError;
use tokio_util::sync::CancellationToken;

use crate::auth;
use crate::error::AppError;
use crate::state::AppState;

/// GET /streams/:token/:action — run the action's read-only pass and flush
/// the rendered buffer.
pub async fn get_stream(
    State(app): State<AppState>,
    Path((token, action_id)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    run_action(
        app,
        token,
        action_id,
        query,
        headers,
        Method::Get,
        serde_json::Value::Null,
    )
    .await
}

/// POST /streams/:token/:action — run the mutate-then-render pass; the
/// engine persists the stream on success.
pub async fn post_stream(
    State(app): State<AppState>,
    Path((token, action_id)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    payload: Option<Json<serde_json::Value>>,
) -> Result<Response, AppError> {
    let payload = payload.map(|Json(p)| p).unwrap_or(serde_json::Value::Null);
    run_action(app, token, action_id, query, headers, Method::Post, payload).await
}

async fn run_action(
    app: AppState,
    token: String,
    action_id: String,
    query: HashMap<String, String>,
    headers: HeaderMap,
    method: Method,
    payload: serde_json::Value,
) -> Result<Response, AppError> {
    let authorization = auth::from_headers(&headers);

    // One snapshot per request: a reload mid-request cannot hand us a
    // mixture of old and new definitions.
    let registry = app.registry.current();

    let mut stream = app.store.load_by_token(&token).await?;
    let template = registry
        .template(&stream.template_id)
        .ok_or_else(|| EngineError::TemplateNotFound(stream.template_id.clone()))?;
    let action = template
        .action(&action_id)
        .ok_or_else(|| EngineError::ActionNotFound(action_id.clone()))?;

    if !action.user_can(&stream, &authorization) {
        return Err(EngineError::Forbidden(action_id).into());
    }

    // Arm the request deadline; the executor refuses to start another step
    // once the token is cancelled.
    let cancel = CancellationToken::new();
    let deadline = {
        let cancel = cancel.clone();
        let timeout = app.request_deadline;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            cancel.cancel();
        })
    };

    let mut buffer = String::new();
    let mut ctx = StepContext::new(
        &mut stream,
        &template,
        &action_id,
        &authorization,
        app.store.as_ref(),
    )
    .with_payload(payload)
    .with_query(query)
    .with_cancel(cancel);

    let pipeline = Pipeline::new(&action.steps);
    let result = match method {
        Method::Get => pipeline.get(&mut ctx, &mut buffer).await,
        Method::Post => pipeline.post(&mut ctx, &mut buffer).await,
    };
    deadline.abort();

    // On failure the partially filled buffer is dropped here; the transport
    // never sees it.
    let outcome = result?;

    if let Some(location) = outcome.redirect {
        return Ok((
            StatusCode::TEMPORARY_REDIRECT,
            [(header::LOCATION, location)],
        )
            .into_response());
    }

    if buffer.is_empty() && method == Method::Post {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    Ok(Html(buffer).into_response())
}
