use std::sync::Arc;

use crate::llm_client::GenerationService;
use crate::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Generation boundary. `LlmClient` in production, scripted in tests.
    pub generator: Arc<dyn GenerationService>,
    pub store: Arc<dyn SessionStore>,
}
