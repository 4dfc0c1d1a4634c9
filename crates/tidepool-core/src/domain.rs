use crate::auth::Authorization;
use crate::object::ContentObject;
use crate::role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Template id the domain settings pages are rendered with.
pub const ADMIN_TEMPLATE: &str = "admin-domain";

/// Per-tenant site settings. The admin pages run against this object; only
/// the domain owner ever holds a role beyond the universal ones, so every
/// rule-gated admin action is owner-only by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub domain_id: Uuid,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub theme_id: String,
    pub state_id: String,
    #[serde(default)]
    pub signup_open: bool,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

impl Domain {
    pub fn new(label: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            domain_id: Uuid::new_v4(),
            label: label.into(),
            description: String::new(),
            theme_id: String::new(),
            state_id: "live".to_string(),
            signup_open: false,
            created_date: now,
            updated_date: now,
        }
    }
}

impl ContentObject for Domain {
    fn object_id(&self) -> Uuid {
        self.domain_id
    }

    fn state_id(&self) -> &str {
        &self.state_id
    }

    fn set_state_id(&mut self, state_id: String) {
        self.state_id = state_id;
    }

    fn roles(&self, auth: &Authorization) -> Vec<String> {
        if auth.domain_owner {
            return vec![role::OWNER.to_string(), role::ANONYMOUS.to_string()];
        }

        let mut roles = vec![role::ANONYMOUS.to_string()];

        if auth.is_authenticated() {
            roles.push(role::AUTHENTICATED.to_string());
        }

        roles
    }

    fn render_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
