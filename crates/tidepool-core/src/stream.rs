use crate::auth::Authorization;
use crate::object::{Attachment, ContentObject};
use crate::role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The primary content object: one node in a domain's content tree.
///
/// Streams are addressed by URL `token`, rendered and mutated by the actions
/// of the template named in `template_id`, and ordered among their siblings
/// by `rank`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    pub stream_id: Uuid,
    pub token: String,
    pub template_id: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    pub state_id: String,
    #[serde(default)]
    pub author_id: Option<Uuid>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub rank: i64,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

impl Stream {
    pub fn new(template_id: impl Into<String>, token: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            stream_id: Uuid::new_v4(),
            token: token.into(),
            template_id: template_id.into(),
            parent_id: None,
            state_id: "default".to_string(),
            author_id: None,
            label: String::new(),
            summary: String::new(),
            rank: 0,
            attachments: Vec::new(),
            created_date: now,
            updated_date: now,
        }
    }
}

impl ContentObject for Stream {
    fn object_id(&self) -> Uuid {
        self.stream_id
    }

    fn state_id(&self) -> &str {
        &self.state_id
    }

    fn set_state_id(&mut self, state_id: String) {
        self.state_id = state_id;
    }

    fn roles(&self, auth: &Authorization) -> Vec<String> {
        // Domain owners are hard-coded to do everything; no other object
        // roles need to be computed. The universal anonymous role still
        // applies so that open actions stay open to owners.
        if auth.domain_owner {
            return vec![role::OWNER.to_string(), role::ANONYMOUS.to_string()];
        }

        let mut roles = vec![role::ANONYMOUS.to_string()];

        if auth.is_authenticated() {
            roles.push(role::AUTHENTICATED.to_string());
        }

        if self.author_id.is_some() && self.author_id == auth.user_id {
            roles.push(role::AUTHOR.to_string());
        }

        roles
    }

    fn render_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    fn attachments_mut(&mut self) -> Option<&mut Vec<Attachment>> {
        Some(&mut self.attachments)
    }
}
