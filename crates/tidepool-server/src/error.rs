use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tidepool_core::EngineError;

/// Unified error type for HTTP responses.
///
/// This is the single boundary where engine errors turn into transport
/// status codes and where internal failures get logged; the pipeline core
/// itself never logs.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<EngineError>() {
            match e {
                EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
                EngineError::TemplateNotFound(_)
                | EngineError::ActionNotFound(_)
                | EngineError::StateNotFound(_)
                | EngineError::ObjectNotFound(_)
                | EngineError::ThemeNotFound(_)
                | EngineError::BundleNotFound(_)
                | EngineError::ViewNotFound(_) => StatusCode::NOT_FOUND,
                EngineError::InvalidPayload { .. } => StatusCode::BAD_REQUEST,
                EngineError::Cancelled => StatusCode::REQUEST_TIMEOUT,
                EngineError::UnknownStep(_)
                | EngineError::InvalidStepParameter { .. }
                | EngineError::UndeclaredState { .. }
                | EngineError::InvalidTemplate { .. }
                | EngineError::InvalidTheme { .. }
                | EngineError::Internal(_)
                | EngineError::Io(_)
                | EngineError::Yaml(_)
                | EngineError::Json(_)
                | EngineError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        // Internal detail stays in the logs, never in the response body.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
            "internal error".to_string()
        } else {
            self.0.to_string()
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
