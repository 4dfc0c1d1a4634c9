use crate::error::{EngineError, Result};
use crate::registry::Registry;
use crate::template::{Template, TemplateConfig};
use crate::theme::{Bundle, BundleConfig, Theme, ThemeConfig};
use std::collections::HashMap;
use std::path::Path;

/// Fallback when a bundle's content type is neither configured nor
/// guessable from its file names.
const OCTET_STREAM: &str = "application/octet-stream";

// ---------------------------------------------------------------------------
// Registry loading
// ---------------------------------------------------------------------------

/// Build a complete registry from a template source directory and an
/// optional theme source directory.
///
/// Each immediate subdirectory defines one template (or theme). Any invalid
/// definition fails the whole build: a reload either publishes a fully
/// valid replacement or leaves the previous registry serving.
pub fn load_registry(templates_dir: &Path, themes_dir: Option<&Path>) -> Result<Registry> {
    let mut registry = Registry::new();

    for dir in subdirectories(templates_dir)? {
        let template = load_template_dir(&dir)?;
        let template_id = template.template_id.clone();
        if registry.put_template(template).is_some() {
            tracing::warn!(%template_id, "duplicate template id; keeping the later definition");
        }
    }

    if let Some(themes_dir) = themes_dir {
        for dir in subdirectories(themes_dir)? {
            let theme = load_theme_dir(&dir)?;
            let theme_id = theme.theme_id.clone();
            if registry.put_theme(theme).is_some() {
                tracing::warn!(%theme_id, "duplicate theme id; keeping the later definition");
            }
        }
    }

    Ok(registry)
}

/// Immediate subdirectories of `dir`, sorted by name so that load order
/// (and therefore duplicate-id resolution) is deterministic.
fn subdirectories(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn directory_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Load one template from its directory: `template.yaml` plus any `*.html`
/// view sources. Other files are bundle assets, referenced from the
/// definition's `bundles` section.
pub fn load_template_dir(dir: &Path) -> Result<Template> {
    let name = directory_name(dir);

    let config_path = dir.join("template.yaml");
    if !config_path.exists() {
        return Err(EngineError::InvalidTemplate {
            template: name,
            reason: "missing template.yaml".to_string(),
        });
    }
    let config: TemplateConfig = serde_yaml::from_str(&std::fs::read_to_string(&config_path)?)?;
    let bundle_configs = config.bundles.clone();

    let mut views = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("html") {
            let view_name = path
                .file_stem()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            views.push((view_name, std::fs::read_to_string(&path)?));
        }
    }
    views.sort();

    let bundles = load_bundles(dir, &bundle_configs)?;
    Ok(Template::from_config(&name, config, &views)?.with_bundles(bundles))
}

// ---------------------------------------------------------------------------
// Themes
// ---------------------------------------------------------------------------

/// Load one theme from its directory: `theme.yaml` plus the bundle files it
/// references.
pub fn load_theme_dir(dir: &Path) -> Result<Theme> {
    let name = directory_name(dir);

    let config_path = dir.join("theme.yaml");
    if !config_path.exists() {
        return Err(EngineError::InvalidTheme {
            theme: name,
            reason: "missing theme.yaml".to_string(),
        });
    }
    let config: ThemeConfig = serde_yaml::from_str(&std::fs::read_to_string(&config_path)?)?;

    let bundles = load_bundles(dir, &config.bundles)?;

    Ok(Theme {
        theme_id: config.theme_id.unwrap_or(name),
        label: config.label,
        category: config.category,
        rank: config.rank,
        is_visible: config.is_visible.unwrap_or(true),
        bundles,
    })
}

// ---------------------------------------------------------------------------
// Bundles
// ---------------------------------------------------------------------------

/// Materialize bundle definitions: concatenate the referenced files (in
/// declaration order) and derive the content type from the first file when
/// none is configured.
fn load_bundles(
    dir: &Path,
    configs: &HashMap<String, BundleConfig>,
) -> Result<HashMap<String, Bundle>> {
    let mut bundles = HashMap::new();

    for (bundle_id, config) in configs {
        let mut content = Vec::new();
        for file in &config.files {
            content.extend(std::fs::read(dir.join(file))?);
        }

        let content_type = match &config.content_type {
            Some(content_type) => content_type.clone(),
            None => config
                .files
                .first()
                .and_then(|f| mime_guess::from_path(f).first_raw())
                .unwrap_or(OCTET_STREAM)
                .to_string(),
        };

        bundles.insert(
            bundle_id.clone(),
            Bundle {
                content_type,
                cache_control: config.cache_control.clone(),
                content,
            },
        );
    }

    Ok(bundles)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    fn template_dir(root: &Path, name: &str, yaml: &str) -> std::path::PathBuf {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        write(&dir, "template.yaml", yaml);
        dir
    }

    #[test]
    fn load_template_with_views_and_bundles() {
        let root = TempDir::new().unwrap();
        let dir = template_dir(
            root.path(),
            "article",
            "label: Article\nstates:\n  draft: {label: Draft}\nactions:\n  view:\n    step: view-html\nbundles:\n  stylesheet:\n    files: [article.css]\n",
        );
        write(&dir, "view.html", "<article>{{ label }}</article>");
        write(&dir, "article.css", "article { margin: 0 }");

        let template = load_template_dir(&dir).unwrap();
        assert_eq!(template.template_id, "article");
        assert!(template.action("view").is_some());
        assert_eq!(template.view_names(), vec!["view"]);

        let bundle = template.bundle("stylesheet").unwrap();
        assert_eq!(bundle.content_type, "text/css");
        assert_eq!(bundle.content, b"article { margin: 0 }");
    }

    #[test]
    fn missing_template_yaml_is_rejected() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("article");
        std::fs::create_dir_all(&dir).unwrap();
        assert!(matches!(
            load_template_dir(&dir),
            Err(EngineError::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn load_registry_from_source_tree() {
        let root = TempDir::new().unwrap();
        let templates = root.path().join("templates");
        std::fs::create_dir_all(&templates).unwrap();
        template_dir(&templates, "article", "label: Article\n");
        template_dir(&templates, "folder", "label: Folder\n");

        let themes = root.path().join("themes");
        let theme_dir = themes.join("plain");
        std::fs::create_dir_all(&theme_dir).unwrap();
        write(
            &theme_dir,
            "theme.yaml",
            "label: Plain\nbundles:\n  script:\n    files: [plain.js]\n    cacheControl: no-store\n",
        );
        write(&theme_dir, "plain.js", "console.log('plain')");

        let registry = load_registry(&templates, Some(&themes)).unwrap();
        assert!(registry.template("article").is_some());
        assert!(registry.template("folder").is_some());

        let theme = registry.theme("plain").unwrap();
        let bundle = theme.bundle("script").unwrap();
        assert_eq!(bundle.cache_control(), "no-store");
        assert!(bundle.content_type.contains("javascript"));
    }

    #[test]
    fn one_invalid_template_fails_the_whole_build() {
        let root = TempDir::new().unwrap();
        let templates = root.path().join("templates");
        std::fs::create_dir_all(&templates).unwrap();
        template_dir(&templates, "article", "label: Article\n");
        template_dir(
            &templates,
            "broken",
            "label: Broken\nactions:\n  edit:\n    steps:\n      - step: frobnicate\n",
        );

        assert!(load_registry(&templates, None).is_err());
    }

    #[test]
    fn duplicate_template_id_keeps_the_later_definition() {
        // Two directories declaring the same template id: the load order is
        // deterministic (sorted by directory name), so the later one wins.
        // This mirrors the last-write-wins behavior of the registry map and
        // exists to pin the behavior down, not to bless it.
        let root = TempDir::new().unwrap();
        let templates = root.path().join("templates");
        std::fs::create_dir_all(&templates).unwrap();
        template_dir(&templates, "a-page", "templateId: page\nlabel: First\n");
        template_dir(&templates, "b-page", "templateId: page\nlabel: Second\n");

        let registry = load_registry(&templates, None).unwrap();
        assert_eq!(registry.template("page").unwrap().label, "Second");
    }
}
