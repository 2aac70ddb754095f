//! Application state.

use std::sync::Arc;

use devgenius_core::QuotaPolicy;
use devgenius_store::JsonFileStore;

use crate::config::ServiceConfig;
use crate::genai::GenAiClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<JsonFileStore>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Generative API client (optional).
    pub genai: Option<Arc<GenAiClient>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<JsonFileStore>, config: ServiceConfig) -> Self {
        let genai = config.gemini_api_key.as_ref().and_then(|key| {
            match GenAiClient::new(&config.gemini_base_url, key, &config.gemini_model) {
                Ok(client) => {
                    tracing::info!(model = %config.gemini_model, "Generative AI enabled");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create generative AI client");
                    None
                }
            }
        });

        if genai.is_none() {
            tracing::warn!("GEMINI_API_KEY not configured - AI generation will not be available");
        }

        Self {
            store,
            config,
            genai,
        }
    }

    /// The quota policy applied to every counter.
    #[must_use]
    pub fn quota_policy(&self) -> QuotaPolicy {
        self.config.quota
    }
}
