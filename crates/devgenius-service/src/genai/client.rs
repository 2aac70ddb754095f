//! Generative API client implementation.

use std::time::Duration;

use reqwest::Client;

use super::types::{ApiErrorResponse, GenerateRequest};

/// Error type for generative API calls.
#[derive(Debug, thiserror::Error)]
pub enum GenAiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("generative API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// The client could not be built.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GenAiClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root (e.g., `"https://generativelanguage.googleapis.com"`)
    /// * `api_key` - API key sent as the `key` query parameter
    /// * `model` - Model name (e.g., `"gemini-2.0-flash"`)
    ///
    /// # Errors
    ///
    /// Returns `GenAiError::Configuration` if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, GenAiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| GenAiError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// The model calls are sent to.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate content. The success body is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns `GenAiError::Api` for non-success statuses and
    /// `GenAiError::Http` for transport failures.
    pub async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<serde_json::Value, GenAiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    async fn handle_response(response: reqwest::Response) -> Result<serde_json::Value, GenAiError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let error_body: Result<ApiErrorResponse, _> = response.json().await;
        let message = match error_body {
            Ok(body) if !body.error.message.is_empty() => body.error.message,
            _ => "Failed to generate AI response".to_string(),
        };

        tracing::warn!(status = %status, message = %message, "Generative API returned an error");

        Err(GenAiError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
