use serde::Deserialize;
use std::collections::HashMap;

/// Sent when a bundle does not configure its own caching policy.
pub const DEFAULT_CACHE_CONTROL: &str = "public, max-age=3600";

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// A static resource (JS, CSS, images) attached to a theme or template and
/// served verbatim by the bundle endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    pub content_type: String,
    pub cache_control: Option<String>,
    pub content: Vec<u8>,
}

impl Bundle {
    pub fn cache_control(&self) -> &str {
        self.cache_control.as_deref().unwrap_or(DEFAULT_CACHE_CONTROL)
    }
}

/// Declarative form of a bundle: the files to concatenate plus optional
/// overrides for the derived metadata.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BundleConfig {
    pub files: Vec<String>,
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// Site-wide look and feel: hard-coded application chrome and the resource
/// bundles it needs. Themes carry no actions; dynamic content is the
/// templates' business.
#[derive(Debug, Clone)]
pub struct Theme {
    pub theme_id: String,
    pub label: String,
    pub category: String,
    pub rank: i64,
    pub is_visible: bool,
    pub bundles: HashMap<String, Bundle>,
}

impl Theme {
    pub fn bundle(&self, bundle_id: &str) -> Option<&Bundle> {
        self.bundles.get(bundle_id)
    }
}

/// Declarative form of a theme, as written in `theme.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeConfig {
    pub theme_id: Option<String>,
    pub label: String,
    pub category: String,
    pub rank: i64,
    pub is_visible: Option<bool>,
    pub bundles: HashMap<String, BundleConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_cache_control_default() {
        let bundle = Bundle {
            content_type: "text/css".to_string(),
            cache_control: None,
            content: Vec::new(),
        };
        assert_eq!(bundle.cache_control(), DEFAULT_CACHE_CONTROL);

        let pinned = Bundle {
            cache_control: Some("no-store".to_string()),
            ..bundle
        };
        assert_eq!(pinned.cache_control(), "no-store");
    }

    #[test]
    fn theme_config_defaults() {
        let config: ThemeConfig = serde_yaml::from_str("label: Plain\n").unwrap();
        assert_eq!(config.label, "Plain");
        assert!(config.theme_id.is_none());
        assert!(config.is_visible.is_none());
        assert!(config.bundles.is_empty());
    }
}
