//! Generative API types.

use serde::{Deserialize, Serialize};

/// Body of a `generateContent` call.
///
/// Accepts `generationConfig` as sent by browser clients as well as the
/// snake_case spelling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Conversation turns.
    pub contents: serde_json::Value,

    /// Sampling settings.
    #[serde(
        rename = "generationConfig",
        alias = "generation_config",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub generation_config: Option<serde_json::Value>,
}

/// Error envelope returned by the generative API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiErrorBody,
}

/// Error details.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// HTTP status code.
    #[serde(default)]
    pub code: Option<u16>,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Canonical status name, e.g. `RESOURCE_EXHAUSTED`.
    #[serde(default)]
    pub status: Option<String>,
}
