use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::store::RoastStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Acquired once at start-up; every handler shares the same backend.
    pub store: Arc<dyn RoastStore>,
    pub llm: LlmClient,
    pub config: Config,
}
