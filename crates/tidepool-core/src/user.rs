use crate::auth::Authorization;
use crate::object::ContentObject;
use crate::role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Template id every user profile page is rendered with.
pub const PROFILE_TEMPLATE: &str = "user-profile";

/// A registered account. Profile pages run the `user-profile` template's
/// actions against this object; the profiled user counts as its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    pub state_id: String,
    #[serde(default)]
    pub status_message: String,
    #[serde(default)]
    pub location: String,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: Uuid::new_v4(),
            username: username.into(),
            display_name: String::new(),
            state_id: "active".to_string(),
            status_message: String::new(),
            location: String::new(),
            created_date: now,
            updated_date: now,
        }
    }
}

impl ContentObject for User {
    fn object_id(&self) -> Uuid {
        self.user_id
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

        if auth.user_id == Some(self.user_id) {
            roles.push(role::AUTHOR.to_string());
        }

        roles
    }

    fn render_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Pipeline, StepContext};
    use crate::step::Step;
    use crate::store::ContentService;
    use crate::template::{Template, TemplateConfig};
    use async_trait::async_trait;

    #[test]
    fn profiled_user_is_author() {
        let user = User::new("aria");
        let roles = user.roles(&Authorization::user(user.user_id));
        assert!(roles.contains(&"author".to_string()));
    }

    #[test]
    fn other_user_is_not_author() {
        let user = User::new("aria");
        let roles = user.roles(&Authorization::user(Uuid::new_v4()));
        assert!(!roles.contains(&"author".to_string()));
        assert!(roles.contains(&"authenticated".to_string()));
    }

    /// Profile persistence is out of band for these tests.
    struct NullService;

    #[async_trait]
    impl ContentService<User> for NullService {
        async fn save(&self, _object: &User, _audit_message: &str) -> crate::Result<()> {
            Ok(())
        }

        async fn reorder_children(&self, _parent_id: Uuid, _order: &[Uuid]) -> crate::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn profile_pages_render_through_the_same_pipeline() {
        let views = vec![("view".to_string(), "@{{ username }}".to_string())];
        let template =
            Template::from_config(PROFILE_TEMPLATE, TemplateConfig::default(), &views).unwrap();

        let mut user = User::new("aria");
        let steps = vec![Step::ViewHtml {
            file: "view".to_string(),
        }];

        let authorization = Authorization::anonymous();
        let service = NullService;
        let mut ctx = StepContext::new(&mut user, &template, "view", &authorization, &service);
        let mut buffer = String::new();
        Pipeline::new(&steps).get(&mut ctx, &mut buffer).await.unwrap();

        assert_eq!(buffer, "@aria");
    }
}
