//! User profile handlers.

use std::sync::Arc;

use axum::extract::State;
use serde::Deserialize;

use devgenius_core::PublicUser;
use devgenius_store::Store;

use crate::auth::{AdminAuth, AuthUser};
use crate::error::ApiError;
use crate::extract::Json;
use crate::state::AppState;

/// Profile update request.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// New display name.
    pub username: String,
}

/// Get the caller's profile.
pub async fn me(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state
        .store
        .get_user(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(PublicUser::from(&user)))
}

/// Change the caller's display name.
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let username = body.username.trim();
    if username.is_empty() {
        return Err(ApiError::BadRequest("Username is required".into()));
    }

    let mut user = state
        .store
        .get_user(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    user.username = username.to_string();
    state.store.update_user(&user)?;

    tracing::info!(user_id = %user.id, "Profile updated");

    Ok(Json(PublicUser::from(&user)))
}

/// List every user (admin only).
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    admin: AdminAuth,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = state.store.list_users()?;

    tracing::info!(admin_id = %admin.admin_id, count = users.len(), "Listed users");

    Ok(Json(users.iter().map(PublicUser::from).collect()))
}
