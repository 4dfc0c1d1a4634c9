use crate::auth::Authorization;
use crate::error::Result;
use crate::object::ContentObject;
use crate::role;
use crate::step::{self, Step};
use serde::Deserialize;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A named, role/state-gated operation on a content object, composed of an
/// ordered step pipeline. Belongs to exactly one template; addressed by id
/// from requests.
#[derive(Debug, Clone, Default)]
pub struct Action {
    /// Roles that may always invoke this action, regardless of state.
    pub roles: Vec<String>,
    /// States in which this action is offered at all. Empty means no state
    /// restriction.
    pub states: Vec<String>,
    /// Per-state role grants, keyed by state id.
    pub state_roles: HashMap<String, Vec<String>>,
    /// Steps executed, in order, when the action runs.
    pub steps: Vec<Step>,
}

impl Action {
    /// Roles permitted to invoke this action on the given object, derived
    /// from the object's current state.
    ///
    /// An empty result means the action is unavailable in the object's
    /// current state — it does not exist right now, independent of actor.
    /// That is distinct from an empty `states` list, which means the action
    /// carries no state restriction at all.
    pub fn allowed_roles(&self, object: &dyn ContentObject) -> Vec<String> {
        // A non-empty state list limits where this action exists at all.
        if !self.states.is_empty() && !self.states.iter().any(|s| s == object.state_id()) {
            return Vec::new();
        }

        // No rules at all: open to everybody.
        if self.roles.is_empty() && self.state_roles.is_empty() {
            return vec![role::ANONYMOUS.to_string()];
        }

        // Owners can always perform rule-gated actions.
        let mut result = vec![role::OWNER.to_string()];
        result.extend(self.roles.iter().cloned());

        if let Some(state_roles) = self.state_roles.get(object.state_id()) {
            result.extend(state_roles.iter().cloned());
        }

        result
    }

    /// True when the actor's roles with respect to the object intersect the
    /// roles allowed for the object's current state.
    pub fn user_can(&self, object: &dyn ContentObject, auth: &Authorization) -> bool {
        let allowed = self.allowed_roles(object);
        let held = object.roles(auth);
        held.iter().any(|r| allowed.contains(r))
    }
}

// ---------------------------------------------------------------------------
// ActionConfig
// ---------------------------------------------------------------------------

/// Declarative form of an action, as written in a template definition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActionConfig {
    pub roles: Vec<String>,
    pub states: Vec<String>,
    pub state_roles: HashMap<String, Vec<String>>,
    pub steps: Vec<serde_yaml::Value>,
    /// Single-step alias: `step: <name>` with no parameters is shorthand
    /// for a one-step `steps` list.
    pub step: Option<String>,
}

impl ActionConfig {
    /// Build the runnable action, parsing every step configuration. The
    /// single-step alias applies only when no explicit step list is given.
    pub fn build(&self) -> Result<Action> {
        let mut steps = step::parse_pipeline(&self.steps)?;

        if steps.is_empty() {
            if let Some(name) = &self.step {
                let mut alias = serde_yaml::Mapping::new();
                alias.insert(
                    serde_yaml::Value::from("step"),
                    serde_yaml::Value::from(name.as_str()),
                );
                steps = vec![Step::parse(&serde_yaml::Value::Mapping(alias))?];
            }
        }

        Ok(Action {
            roles: self.roles.clone(),
            states: self.states.clone(),
            state_roles: self.state_roles.clone(),
            steps,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
