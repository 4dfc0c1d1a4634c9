use std::path::Path;
use tidepool_core::load;

/// Run the registry build path once and report what it found. The
/// pre-flight for template authors: a definition rejected here is the same
/// definition a live reload would refuse to publish.
pub fn run(templates: &Path, themes: Option<&Path>, json: bool) -> anyhow::Result<()> {
    match load::load_registry(templates, themes) {
        Ok(registry) => {
            let mut template_ids: Vec<String> = registry
                .templates()
                .map(|t| t.template_id.clone())
                .collect();
            template_ids.sort();
            let mut theme_ids: Vec<String> =
                registry.themes().map(|t| t.theme_id.clone()).collect();
            theme_ids.sort();

            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "ok": true,
                        "templates": template_ids,
                        "themes": theme_ids,
                    })
                );
            } else {
                println!(
                    "ok: {} templates, {} themes",
                    template_ids.len(),
                    theme_ids.len()
                );
                for id in &template_ids {
                    println!("  template {id}");
                }
                for id in &theme_ids {
                    println!("  theme {id}");
                }
            }
            Ok(())
        }
        Err(err) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "ok": false, "error": err.to_string() })
                );
            } else {
                eprintln!("invalid definition: {err}");
            }
            anyhow::bail!("validation failed")
        }
    }
}
