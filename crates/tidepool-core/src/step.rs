use crate::error::{EngineError, Result};
use serde_yaml::Value;

/// Content format tag used when an editing surface does not name one.
pub const DEFAULT_CONTENT_FORMAT: &str = "editorjs";

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// One unit of pipeline work.
///
/// A closed set of variants configured by data: each carries only the
/// parameters it needs, parsed from the declarative step list of an action.
/// Steps hold no per-request state; everything request-scoped lives in the
/// execution context.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Move the object to a fixed target state.
    SetState { state: String },

    /// Renumber the display rank of the object's children from a request
    /// payload. `keys` names the payload field holding the ordered ids,
    /// `values` names the attribute being renumbered.
    Sort {
        keys: String,
        values: String,
        message: String,
    },

    /// Renumber the display rank of the object's own attachments from a
    /// request payload.
    SortAttachments {
        keys: String,
        values: String,
        message: String,
    },

    /// Attach a content-editing surface to the render context so that later
    /// view evaluation can embed the matching editor.
    EditContent { file: String, format: String },

    /// Evaluate a URL pattern against the render context and redirect
    /// there, superseding any body output.
    RedirectTo { url: String },

    /// Render a named view from the owning template into the output buffer.
    ViewHtml { file: String },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::SetState { .. } => "set-state",
            Step::Sort { .. } => "sort",
            Step::SortAttachments { .. } => "sort-attachments",
            Step::EditContent { .. } => "edit-content",
            Step::RedirectTo { .. } => "redirect-to",
            Step::ViewHtml { .. } => "view-html",
        }
    }

    /// Parse a single step from its configuration record. The record names
    /// the step under the `step` key; remaining keys are the step's own
    /// parameters. Unknown step names and mistyped parameters are
    /// configuration errors — parsing never touches a content object.
    pub fn parse(config: &Value) -> Result<Step> {
        let name = match config.get("step") {
            Some(Value::String(name)) => name.as_str(),
            _ => {
                return Err(EngineError::UnknownStep(
                    "(missing 'step' name)".to_string(),
                ))
            }
        };

        match name {
            "set-state" => Ok(Step::SetState {
                state: required_str(config, name, "state")?,
            }),
            "sort" => Ok(Step::Sort {
                keys: optional_str(config, name, "keys")?.unwrap_or_else(|| "_id".to_string()),
                values: optional_str(config, name, "values")?
                    .unwrap_or_else(|| "rank".to_string()),
                message: optional_str(config, name, "message")?.unwrap_or_default(),
            }),
            "sort-attachments" => Ok(Step::SortAttachments {
                keys: optional_str(config, name, "keys")?.unwrap_or_else(|| "_id".to_string()),
                values: optional_str(config, name, "values")?
                    .unwrap_or_else(|| "rank".to_string()),
                message: optional_str(config, name, "message")?.unwrap_or_default(),
            }),
            "edit-content" => Ok(Step::EditContent {
                file: optional_str(config, name, "file")?.unwrap_or_default(),
                format: optional_str(config, name, "format")?
                    .unwrap_or_else(|| DEFAULT_CONTENT_FORMAT.to_string()),
            }),
            "redirect-to" => Ok(Step::RedirectTo {
                url: required_str(config, name, "url")?,
            }),
            "view-html" => Ok(Step::ViewHtml {
                file: optional_str(config, name, "file")?.unwrap_or_default(),
            }),
            other => Err(EngineError::UnknownStep(other.to_string())),
        }
    }
}

/// Parse an ordered list of step configurations into an ordered pipeline.
/// Fails on the first unrecognized step or invalid parameter.
pub fn parse_pipeline(configs: &[Value]) -> Result<Vec<Step>> {
    configs.iter().map(Step::parse).collect()
}

// ---------------------------------------------------------------------------
// Parameter helpers
// ---------------------------------------------------------------------------

fn optional_str(config: &Value, step: &str, key: &str) -> Result<Option<String>> {
    match config.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(EngineError::InvalidStepParameter {
            step: step.to_string(),
            parameter: key.to_string(),
            reason: format!("expected a string, got {}", value_kind(other)),
        }),
    }
}

fn required_str(config: &Value, step: &str, key: &str) -> Result<String> {
    match optional_str(config, step, key)? {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(EngineError::InvalidStepParameter {
            step: step.to_string(),
            parameter: key.to_string(),
            reason: "required".to_string(),
        }),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
