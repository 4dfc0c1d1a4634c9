use std::sync::Arc;
use std::time::Duration;
use tidepool_core::registry::RegistryHandle;
use tidepool_core::store::MemoryStore;

/// Per-request deadline after which pipeline execution is cancelled at the
/// next step boundary.
pub const DEFAULT_REQUEST_DEADLINE: Duration = Duration::from_secs(30);

/// Shared application state passed to all route handlers.
///
/// The registry handle is the only state shared with the reload watcher;
/// handlers take lock-free snapshots of it per request.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RegistryHandle>,
    pub store: Arc<MemoryStore>,
    pub request_deadline: Duration,
}

impl AppState {
    pub fn new(registry: Arc<RegistryHandle>, store: Arc<MemoryStore>) -> Self {
        Self {
            registry,
            store,
            request_deadline: DEFAULT_REQUEST_DEADLINE,
        }
    }

    pub fn with_request_deadline(mut self, deadline: Duration) -> Self {
        self.request_deadline = deadline;
        self
    }
}
