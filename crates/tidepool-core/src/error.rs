use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unrecognized step: {0}")]
    UnknownStep(String),

    #[error("invalid parameter '{parameter}' for step '{step}': {reason}")]
    InvalidStepParameter {
        step: String,
        parameter: String,
        reason: String,
    },

    #[error("action '{action}' grants roles in undeclared state: {state}")]
    UndeclaredState { action: String, state: String },

    #[error("invalid template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("invalid theme '{theme}': {reason}")]
    InvalidTheme { theme: String, reason: String },

    #[error("action '{0}' is not permitted")]
    Forbidden(String),

    #[error("invalid payload for step '{step}': {reason}")]
    InvalidPayload { step: String, reason: String },

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("action not found: {0}")]
    ActionNotFound(String),

    #[error("state not found: {0}")]
    StateNotFound(String),

    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("theme not found: {0}")]
    ThemeNotFound(String),

    #[error("bundle not found: {0}")]
    BundleNotFound(String),

    #[error("view not found: {0}")]
    ViewNotFound(String),

    #[error("cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("render error: {0}")]
    Render(#[from] tera::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
