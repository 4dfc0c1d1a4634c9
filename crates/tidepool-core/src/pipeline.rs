use crate::auth::Authorization;
use crate::error::{EngineError, Result};
use crate::object::ContentObject;
use crate::step::Step;
use crate::store::ContentService;
use crate::template::Template;
use serde::Serialize;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Method / Outcome / EditorSurface
// ---------------------------------------------------------------------------

/// Which of the two execution modes a pipeline run uses. The same ordered
/// step list serves both: `Get` is the read-only prepare/render pass,
/// `Post` mutates the object and persists it on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// What the transport should do after a successful run. A set `redirect`
/// supersedes whatever was rendered into the buffer.
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    pub redirect: Option<String>,
}

/// The content-editing surface a pipeline associates with the render
/// context, so view evaluation can embed the matching editor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorSurface {
    pub file: String,
    pub format: String,
}

// ---------------------------------------------------------------------------
// StepContext
// ---------------------------------------------------------------------------

/// Everything one pipeline run reads and writes: the object being acted on,
/// the published template, the actor, the request payload, and the outcome
/// being accumulated. Request-scoped; steps see each other's effects.
pub struct StepContext<'a, O: ContentObject> {
    pub object: &'a mut O,
    pub template: &'a Template,
    pub action_id: &'a str,
    pub authorization: &'a Authorization,
    pub payload: serde_json::Value,
    pub query: HashMap<String, String>,
    pub service: &'a dyn ContentService<O>,
    pub cancel: CancellationToken,
    editor: Option<EditorSurface>,
    redirect: Option<String>,
    audit: Vec<String>,
}

impl<'a, O: ContentObject> StepContext<'a, O> {
    pub fn new(
        object: &'a mut O,
        template: &'a Template,
        action_id: &'a str,
        authorization: &'a Authorization,
        service: &'a dyn ContentService<O>,
    ) -> Self {
        Self {
            object,
            template,
            action_id,
            authorization,
            payload: serde_json::Value::Null,
            query: HashMap::new(),
            service,
            cancel: CancellationToken::new(),
            editor: None,
            redirect: None,
            audit: Vec::new(),
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn editor(&self) -> Option<&EditorSurface> {
        self.editor.as_ref()
    }

    /// Human-readable audit trail accumulated by the steps of this run,
    /// handed to the content service on save.
    pub fn audit_message(&self) -> String {
        self.audit.join(", ")
    }

    /// The evaluation context views and URL patterns see: the object
    /// snapshot, the action and template ids, the query string, and the
    /// editing surface when one was attached.
    pub fn render_context(&self) -> Result<tera::Context> {
        let value = self.object.render_value();
        let mut context = tera::Context::from_value(value)?;
        context.insert("actionId", self.action_id);
        context.insert("templateId", &self.template.template_id);
        context.insert("query", &self.query);
        if let Some(editor) = &self.editor {
            context.insert("editor", editor);
        }
        Ok(context)
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Executes an action's ordered step list against one content object and
/// one output buffer.
///
/// Execution is fail-fast: the first failing step aborts the rest, and the
/// caller discards whatever reached the buffer. Output is buffered, never
/// streamed; the transport only sees it after the whole sequence succeeds.
/// Mutations accumulate on the object and are visible to later steps in the
/// same run. A `Post` run that completes persists the object through the
/// content service; a failed or cancelled run never does.
pub struct Pipeline<'a> {
    steps: &'a [Step],
}

impl<'a> Pipeline<'a> {
    pub fn new(steps: &'a [Step]) -> Self {
        Self { steps }
    }

    /// Read-only prepare/render pass.
    pub async fn get<O: ContentObject>(
        &self,
        ctx: &mut StepContext<'_, O>,
        buffer: &mut String,
    ) -> Result<Outcome> {
        self.run(Method::Get, ctx, buffer).await
    }

    /// Mutate-then-render pass. Persists on success.
    pub async fn post<O: ContentObject>(
        &self,
        ctx: &mut StepContext<'_, O>,
        buffer: &mut String,
    ) -> Result<Outcome> {
        self.run(Method::Post, ctx, buffer).await
    }

    async fn run<O: ContentObject>(
        &self,
        method: Method,
        ctx: &mut StepContext<'_, O>,
        buffer: &mut String,
    ) -> Result<Outcome> {
        for step in self.steps {
            // An in-flight step finishes its unit of work; the next one
            // must not start once cancellation is signaled.
            if ctx.cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }

            execute(method, step, ctx, buffer).await?;

            // A redirect supersedes all remaining output.
            if ctx.redirect.is_some() {
                break;
            }
        }

        if method == Method::Post {
            if ctx.cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            let audit = ctx.audit_message();
            ctx.service.save(ctx.object, &audit).await?;
        }

        Ok(Outcome {
            redirect: ctx.redirect.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Step dispatch
// ---------------------------------------------------------------------------

async fn execute<O: ContentObject>(
    method: Method,
    step: &Step,
    ctx: &mut StepContext<'_, O>,
    buffer: &mut String,
) -> Result<()> {
    match step {
        Step::SetState { state } => {
            if method == Method::Post {
                ctx.object.set_state_id(state.clone());
            }
            Ok(())
        }

        Step::Sort { keys, message, .. } => {
            if method != Method::Post {
                return Ok(());
            }
            let Some(order) = decode_order(step.name(), &ctx.payload, keys)? else {
                return Ok(());
            };
            if order.is_empty() {
                return Ok(());
            }
            let service = ctx.service;
            service
                .reorder_children(ctx.object.object_id(), &order)
                .await?;
            if !message.is_empty() {
                ctx.audit.push(message.clone());
            }
            Ok(())
        }

        Step::SortAttachments { keys, message, .. } => {
            if method != Method::Post {
                return Ok(());
            }
            let Some(order) = decode_order(step.name(), &ctx.payload, keys)? else {
                return Ok(());
            };
            if order.is_empty() {
                return Ok(());
            }
            if let Some(attachments) = ctx.object.attachments_mut() {
                for (index, attachment_id) in order.iter().enumerate() {
                    if let Some(attachment) = attachments
                        .iter_mut()
                        .find(|a| a.attachment_id == *attachment_id)
                    {
                        attachment.rank = index as i64 + 1;
                    }
                }
                attachments.sort_by_key(|a| a.rank);
                if !message.is_empty() {
                    ctx.audit.push(message.clone());
                }
            }
            Ok(())
        }

        Step::EditContent { file, format } => {
            let file = if file.is_empty() {
                ctx.action_id.to_string()
            } else {
                file.clone()
            };
            ctx.editor = Some(EditorSurface {
                file,
                format: format.clone(),
            });
            Ok(())
        }

        Step::RedirectTo { url } => {
            let context = ctx.render_context()?;
            let location = tera::Tera::one_off(url, &context, false)?;
            ctx.redirect = Some(location);
            Ok(())
        }

        Step::ViewHtml { file } => {
            if method != Method::Get {
                return Ok(());
            }
            let name = if file.is_empty() {
                ctx.action_id
            } else {
                file.as_str()
            };
            let context = ctx.render_context()?;
            let html = ctx.template.render_view(name, &context)?;
            buffer.push_str(&html);
            Ok(())
        }
    }
}

/// Decode the ordered id list a sort step consumes from the request
/// payload. Returns `None` when the payload carries no ordering at all (a
/// silent no-op); fails when the field is present but undecodable.
fn decode_order(step: &str, payload: &serde_json::Value, keys: &str) -> Result<Option<Vec<Uuid>>> {
    let field = match payload.get(keys) {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(field) => field,
    };

    let items = field.as_array().ok_or_else(|| EngineError::InvalidPayload {
        step: step.to_string(),
        reason: format!("'{keys}' must be an array of ids"),
    })?;

    let mut order = Vec::with_capacity(items.len());
    for item in items {
        let raw = item.as_str().ok_or_else(|| EngineError::InvalidPayload {
            step: step.to_string(),
            reason: format!("'{keys}' entries must be id strings"),
        })?;
        let id = Uuid::parse_str(raw).map_err(|_| EngineError::InvalidPayload {
            step: step.to_string(),
            reason: format!("'{raw}' is not a valid id"),
        })?;
        order.push(id);
    }

    Ok(Some(order))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
