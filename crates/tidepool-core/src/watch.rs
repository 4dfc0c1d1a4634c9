use crate::load;
use crate::registry::RegistryHandle;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// How often the watcher samples the source directories for changes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(800);

/// Watch the template/theme source directories and republish the registry
/// when they change.
///
/// The task samples modification times on an interval; when the newest
/// mtime moves it rebuilds the whole registry through the same validating
/// path used at startup. Only a fully valid build is published — a failed
/// rebuild is reported and the previous registry keeps serving. In-flight
/// requests are never interrupted: they hold their own snapshot.
pub fn spawn(
    handle: Arc<RegistryHandle>,
    templates_dir: PathBuf,
    themes_dir: Option<PathBuf>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut last_seen = latest_mtime(&templates_dir, themes_dir.as_deref());

        loop {
            tokio::time::sleep(interval).await;

            let current = latest_mtime(&templates_dir, themes_dir.as_deref());
            if current == last_seen {
                continue;
            }
            last_seen = current;

            match load::load_registry(&templates_dir, themes_dir.as_deref()) {
                Ok(registry) => {
                    handle.publish(registry);
                    tracing::info!("template definitions reloaded");
                }
                Err(error) => {
                    tracing::error!(%error, "template reload failed; keeping previous definitions");
                }
            }
        }
    })
}

/// Newest modification time anywhere under the source directories. `None`
/// when nothing is readable; any change to the result triggers a rebuild.
fn latest_mtime(templates_dir: &Path, themes_dir: Option<&Path>) -> Option<SystemTime> {
    let mut newest = scan(templates_dir);
    if let Some(themes_dir) = themes_dir {
        newest = newest.max(scan(themes_dir));
    }
    newest
}

fn scan(dir: &Path) -> Option<SystemTime> {
    let mut newest = None;
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return None,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            newest = newest.max(scan(&path));
        } else if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
            newest = newest.max(Some(modified));
        }
    }

    newest
}
