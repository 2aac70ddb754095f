//! Message credit handlers.
//!
//! "Credits" here are the caller's message counter for the current quota
//! window, as consumed by the AI route.

use std::sync::Arc;

use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use devgenius_core::{PublicUser, QuotaPeriod, Subscription, UserId};
use devgenius_store::{Store, StoreError};

use crate::auth::{AdminAuth, AuthUser};
use crate::error::ApiError;
use crate::extract::Json;
use crate::state::AppState;

/// Credit usage response.
#[derive(Debug, Serialize)]
pub struct CreditsResponse {
    /// Messages used in the current window.
    pub used_credits: u32,
    /// Limit for the current window.
    pub total_credits: u32,
    /// Name of the plan behind the limit.
    pub plan_name: String,
    /// Window length.
    pub period: QuotaPeriod,
    /// When the counter resets.
    pub reset_at: DateTime<Utc>,
    /// The caller's current subscription.
    pub subscription: Option<Subscription>,
}

/// Credit update response.
#[derive(Debug, Serialize)]
pub struct UpdateCreditsResponse {
    /// Always true.
    pub success: bool,
    /// Counter after the increment.
    pub new_count: u32,
}

/// Credit reset response.
#[derive(Debug, Serialize)]
pub struct ResetCreditsResponse {
    /// Always true.
    pub success: bool,
    /// The user's profile after the reset.
    pub user: PublicUser,
    /// When the new window resets.
    pub reset_at: DateTime<Utc>,
}

/// Get the caller's message usage.
pub async fn get_credits(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<CreditsResponse>, ApiError> {
    let policy = state.quota_policy();
    let snapshot = state
        .store
        .usage_snapshot(&auth.user_id, &policy, Utc::now())?;

    Ok(Json(CreditsResponse {
        used_credits: snapshot.usage.count,
        total_credits: snapshot.limit,
        plan_name: snapshot.plan.map_or_else(|| "Free".to_string(), |p| p.name),
        period: policy.period,
        reset_at: snapshot.usage.reset_at(policy.period),
        subscription: snapshot.subscription,
    }))
}

/// Record one message outside the AI route.
pub async fn update_credits(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<UpdateCreditsResponse>, ApiError> {
    let usage = state
        .store
        .record_message(&auth.user_id, &state.quota_policy(), Utc::now())?;

    tracing::debug!(user_id = %auth.user_id, count = usage.count, "Message recorded");

    Ok(Json(UpdateCreditsResponse {
        success: true,
        new_count: usage.count,
    }))
}

/// Zero a user's message counter and restart their window (admin only).
pub async fn reset_credits(
    State(state): State<Arc<AppState>>,
    admin: AdminAuth,
    Path(user_id): Path<String>,
) -> Result<Json<ResetCreditsResponse>, ApiError> {
    let user_id: UserId = user_id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid user id".into()))?;

    let policy = state.quota_policy();
    let usage = state
        .store
        .reset_usage(&user_id, &policy, Utc::now())
        .map_err(|e| match e {
            StoreError::NotFound { .. } => ApiError::NotFound("User not found".into()),
            other => other.into(),
        })?;
    let user = state
        .store
        .get_user(&user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    tracing::info!(admin_id = %admin.admin_id, user_id = %user_id, "Credits reset");

    Ok(Json(ResetCreditsResponse {
        success: true,
        user: PublicUser::from(&user),
        reset_at: usage.reset_at(policy.period),
    }))
}
