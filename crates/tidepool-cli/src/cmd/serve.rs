use std::path::PathBuf;
use std::sync::Arc;
use tidepool_core::store::MemoryStore;
use tidepool_server::ServeOptions;

pub fn run(
    templates: PathBuf,
    themes: Option<PathBuf>,
    port: u16,
    watch: bool,
) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(tidepool_server::serve(
        ServeOptions {
            templates_dir: templates,
            themes_dir: themes,
            port,
            watch,
        },
        Arc::new(MemoryStore::new()),
    ))
}
