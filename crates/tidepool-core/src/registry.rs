use crate::action::Action;
use crate::template::{StateDef, Template};
use crate::theme::Theme;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The published set of template and theme definitions.
///
/// Built wholesale by the loader, never mutated afterwards; a reload builds
/// a complete replacement and publishes it through [`RegistryHandle`].
#[derive(Debug, Default)]
pub struct Registry {
    templates: HashMap<String, Arc<Template>>,
    themes: HashMap<String, Arc<Theme>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template. A duplicate id replaces the earlier entry.
    pub fn put_template(&mut self, template: Template) -> Option<Arc<Template>> {
        self.templates
            .insert(template.template_id.clone(), Arc::new(template))
    }

    pub fn put_theme(&mut self, theme: Theme) -> Option<Arc<Theme>> {
        self.themes.insert(theme.theme_id.clone(), Arc::new(theme))
    }

    pub fn template(&self, template_id: &str) -> Option<Arc<Template>> {
        self.templates.get(template_id).cloned()
    }

    pub fn theme(&self, theme_id: &str) -> Option<Arc<Theme>> {
        self.themes.get(theme_id).cloned()
    }

    pub fn action(&self, template_id: &str, action_id: &str) -> Option<Action> {
        self.templates
            .get(template_id)
            .and_then(|t| t.action(action_id))
            .cloned()
    }

    pub fn state(&self, template_id: &str, state_id: &str) -> Option<StateDef> {
        self.templates
            .get(template_id)
            .and_then(|t| t.state(state_id))
            .cloned()
    }

    pub fn templates(&self) -> impl Iterator<Item = &Arc<Template>> {
        self.templates.values()
    }

    pub fn themes(&self) -> impl Iterator<Item = &Arc<Theme>> {
        self.themes.values()
    }
}

// ---------------------------------------------------------------------------
// RegistryHandle
// ---------------------------------------------------------------------------

/// Shared access to the currently published registry.
///
/// Request tasks read lock-free snapshots; the reload watcher stores
/// fully-validated replacements. Readers always observe either the old or
/// the new registry in full, never a mixture.
#[derive(Debug)]
pub struct RegistryHandle {
    inner: ArcSwap<Registry>,
}

impl RegistryHandle {
    pub fn new(registry: Registry) -> Self {
        Self {
            inner: ArcSwap::from_pointee(registry),
        }
    }

    /// Snapshot of the current registry. The snapshot stays valid (and
    /// internally consistent) even if a reload publishes a replacement
    /// while it is in use.
    pub fn current(&self) -> Arc<Registry> {
        self.inner.load_full()
    }

    /// Atomically replace the published registry.
    pub fn publish(&self, registry: Registry) {
        self.inner.store(Arc::new(registry));
    }
}

impl Default for RegistryHandle {
    fn default() -> Self {
        Self::new(Registry::new())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateConfig;

    fn template(id: &str, label: &str, action_id: &str) -> Template {
        let yaml = format!(
            "templateId: {id}\nlabel: {label}\nstates:\n  live: {{}}\nactions:\n  {action_id}: {{}}\n"
        );
        let config: TemplateConfig = serde_yaml::from_str(&yaml).unwrap();
        Template::from_config(id, config, &[]).unwrap()
    }

    #[test]
    fn lookup_by_id() {
        let mut registry = Registry::new();
        registry.put_template(template("article", "Article", "view"));

        assert!(registry.template("article").is_some());
        assert!(registry.template("missing").is_none());
        assert!(registry.action("article", "view").is_some());
        assert!(registry.action("article", "missing").is_none());
        assert!(registry.state("article", "live").is_some());
        assert!(registry.state("article", "retired").is_none());
    }

    #[test]
    fn duplicate_template_id_replaces_earlier() {
        let mut registry = Registry::new();
        registry.put_template(template("article", "First", "view"));
        let previous = registry.put_template(template("article", "Second", "view"));

        assert!(previous.is_some());
        assert_eq!(registry.template("article").unwrap().label, "Second");
    }

    #[tokio::test]
    async fn published_snapshots_are_never_mixed() {
        // Two internally consistent registries; concurrent readers must see
        // one of them in full, never old states with new actions.
        let make = |label: &str, action: &str| {
            let mut registry = Registry::new();
            registry.put_template(template("page", label, action));
            registry
        };

        let handle = Arc::new(RegistryHandle::new(make("one", "a-one")));

        let reader = {
            let handle = handle.clone();
            tokio::spawn(async move {
                for _ in 0..1000 {
                    let snapshot = handle.current();
                    let page = snapshot.template("page").expect("page always published");
                    let consistent = (page.label == "one" && page.action("a-one").is_some())
                        || (page.label == "two" && page.action("a-two").is_some());
                    assert!(consistent, "observed a mixed registry");
                    tokio::task::yield_now().await;
                }
            })
        };

        let writer = {
            let handle = handle.clone();
            tokio::spawn(async move {
                for i in 0..1000 {
                    if i % 2 == 0 {
                        handle.publish(make("two", "a-two"));
                    } else {
                        handle.publish(make("one", "a-one"));
                    }
                    tokio::task::yield_now().await;
                }
            })
        };

        reader.await.unwrap();
        writer.await.unwrap();
    }
}
