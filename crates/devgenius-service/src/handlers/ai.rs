//! Generative-AI proxy handler.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderName, HeaderValue};
use axum::response::{AppendHeaders, IntoResponse};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::Json;
use crate::genai::GenerateRequest;
use crate::quota;
use crate::state::AppState;

/// Header carrying the messages left in the caller's window.
pub const REMAINING_HEADER: HeaderName = HeaderName::from_static("x-messages-remaining");

/// Relay a prompt to the generative API, consuming one message.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<GenerateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let client = state
        .genai
        .clone()
        .ok_or_else(|| ApiError::Internal("AI service not configured".into()))?;

    let admission = quota::enforce(&state, &auth)?;

    let response = client.generate(&body).await.map_err(|e| {
        tracing::warn!(user_id = %auth.user_id, error = %e, "AI generation failed");
        ApiError::from(e)
    })?;

    tracing::info!(
        user_id = %auth.user_id,
        model = %client.model(),
        remaining = admission.remaining,
        "AI response generated"
    );

    Ok((
        AppendHeaders([(REMAINING_HEADER, HeaderValue::from(admission.remaining))]),
        Json(response),
    ))
}
