use crate::action::{Action, ActionConfig};
use crate::error::{EngineError, Result};
use crate::role::RoleDef;
use crate::theme::{Bundle, BundleConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// StateDef / SortDirection
// ---------------------------------------------------------------------------

/// A named lifecycle position a content object can occupy. Identity only;
/// access rules match on the state id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDef {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// Declarative definition of a content class: the states its objects move
/// through, the roles it grants, the actions that can be performed, and the
/// compiled views those actions render.
///
/// Constructed once per (re)load and immutable afterwards; a reload replaces
/// the whole value, so readers never observe a partial update.
pub struct Template {
    pub template_id: String,
    pub label: String,
    pub description: String,
    pub category: String,
    pub icon: String,
    /// Template ids whose objects may contain objects of this template.
    pub contained_by: Vec<String>,
    pub child_sort_type: String,
    pub child_sort_direction: SortDirection,
    pub states: HashMap<String, StateDef>,
    pub roles: HashMap<String, RoleDef>,
    pub actions: HashMap<String, Action>,
    pub bundles: HashMap<String, Bundle>,
    views: tera::Tera,
}

impl Template {
    pub fn state(&self, state_id: &str) -> Option<&StateDef> {
        self.states.get(state_id)
    }

    pub fn action(&self, action_id: &str) -> Option<&Action> {
        self.actions.get(action_id)
    }

    pub fn bundle(&self, bundle_id: &str) -> Option<&Bundle> {
        self.bundles.get(bundle_id)
    }

    pub fn can_be_contained_by(&self, template_id: &str) -> bool {
        self.contained_by.iter().any(|t| t == template_id)
    }

    /// Names of the views compiled for this template, sorted.
    pub fn view_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.views.get_template_names().collect();
        names.sort_unstable();
        names
    }

    /// Evaluate a named view against the given render context.
    pub fn render_view(&self, name: &str, context: &tera::Context) -> Result<String> {
        if !self.views.get_template_names().any(|n| n == name) {
            return Err(EngineError::ViewNotFound(name.to_string()));
        }
        Ok(self.views.render(name, context)?)
    }

    /// Build and validate a template from its declarative form plus its view
    /// sources. Every step configuration must parse, every view must
    /// compile, and every state referenced by an action's per-state role
    /// grants must be declared on this template.
    pub fn from_config(
        fallback_id: &str,
        config: TemplateConfig,
        views: &[(String, String)],
    ) -> Result<Template> {
        let template_id = config
            .template_id
            .unwrap_or_else(|| fallback_id.to_string());

        let mut actions = HashMap::new();
        for (action_id, action_config) in &config.actions {
            let action = action_config.build()?;

            for state_id in action.state_roles.keys() {
                if !config.states.contains_key(state_id) {
                    return Err(EngineError::UndeclaredState {
                        action: action_id.clone(),
                        state: state_id.clone(),
                    });
                }
            }

            actions.insert(action_id.clone(), action);
        }

        let mut compiled = tera::Tera::default();
        for (name, source) in views {
            compiled.add_raw_template(name, source)?;
        }

        Ok(Template {
            template_id,
            label: config.label,
            description: config.description,
            category: config.category,
            icon: config.icon,
            contained_by: config.contained_by,
            child_sort_type: config.child_sort_type,
            child_sort_direction: config.child_sort_direction,
            states: config.states,
            roles: config.roles,
            actions,
            bundles: HashMap::new(),
            views: compiled,
        })
    }

    pub fn with_bundles(mut self, bundles: HashMap<String, Bundle>) -> Self {
        self.bundles = bundles;
        self
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("template_id", &self.template_id)
            .field("label", &self.label)
            .field("states", &self.states.keys().collect::<Vec<_>>())
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// TemplateConfig
// ---------------------------------------------------------------------------

fn default_child_sort_type() -> String {
    "rank".to_string()
}

/// Declarative form of a template, as written in `template.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TemplateConfig {
    pub template_id: Option<String>,
    pub label: String,
    pub description: String,
    pub category: String,
    pub icon: String,
    pub contained_by: Vec<String>,
    #[serde(default = "default_child_sort_type")]
    pub child_sort_type: String,
    pub child_sort_direction: SortDirection,
    pub states: HashMap<String, StateDef>,
    pub roles: HashMap<String, RoleDef>,
    pub actions: HashMap<String, ActionConfig>,
    pub bundles: HashMap<String, BundleConfig>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
