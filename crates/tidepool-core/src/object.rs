use crate::auth::Authorization;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Attachment
// ---------------------------------------------------------------------------

/// A secondary record attached to a content object (an uploaded file, an
/// embedded image). Display order is carried by `rank`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub attachment_id: Uuid,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub rank: i64,
    pub created_date: DateTime<Utc>,
}

impl Attachment {
    pub fn new(label: impl Into<String>, rank: i64) -> Self {
        Self {
            attachment_id: Uuid::new_v4(),
            label: label.into(),
            rank,
            created_date: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// ContentObject
// ---------------------------------------------------------------------------

/// The seam between the pipeline engine and the things it acts on.
///
/// Implemented by every object a template's actions can target (streams,
/// user profiles, domain settings). Objects are request-local while a
/// pipeline runs; persistence happens through the owning content service
/// only after a successful mutate-mode run.
pub trait ContentObject: Send {
    fn object_id(&self) -> Uuid;

    /// Current lifecycle state, matched against action access rules.
    fn state_id(&self) -> &str;

    fn set_state_id(&mut self, state_id: String);

    /// Roles the given actor holds with respect to this object. Role
    /// membership is object-dependent: authorship and ownership can only be
    /// decided against a concrete object.
    fn roles(&self, auth: &Authorization) -> Vec<String>;

    /// Snapshot of the object for template evaluation. Must serialize to a
    /// JSON object.
    fn render_value(&self) -> serde_json::Value;

    /// Mutable access to the object's attachment list, for objects that
    /// have one. Steps that reorder attachments are a no-op on objects
    /// without them.
    fn attachments_mut(&mut self) -> Option<&mut Vec<Attachment>> {
        None
    }
}
