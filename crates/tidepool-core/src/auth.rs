use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The requesting actor's identity, computed once at the transport boundary.
/// Read-only for the duration of a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Authorization {
    pub user_id: Option<Uuid>,
    pub domain_owner: bool,
}

impl Authorization {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            domain_owner: false,
        }
    }

    pub fn owner(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            domain_owner: true,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_is_not_authenticated() {
        let auth = Authorization::anonymous();
        assert!(!auth.is_authenticated());
        assert!(!auth.domain_owner);
    }

    #[test]
    fn owner_is_authenticated() {
        let auth = Authorization::owner(Uuid::new_v4());
        assert!(auth.is_authenticated());
        assert!(auth.domain_owner);
    }
}
