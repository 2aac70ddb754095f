//! Registration and login handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use devgenius_core::{PublicUser, User};
use devgenius_store::Store;

use crate::auth::issue_token;
use crate::crypto::{hash_password_blocking, verify_password_blocking};
use crate::error::ApiError;
use crate::extract::Json;
use crate::state::AppState;

/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name.
    #[serde(default)]
    pub username: Option<String>,
    /// Login email.
    #[serde(default)]
    pub email: Option<String>,
    /// Plaintext password.
    #[serde(default)]
    pub password: Option<String>,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    #[serde(default)]
    pub email: Option<String>,
    /// Plaintext password.
    #[serde(default)]
    pub password: Option<String>,
}

/// Session response for register and login.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Outcome message.
    pub message: String,
    /// Bearer token.
    pub token: String,
    /// The user's public profile.
    pub user: PublicUser,
}

fn required(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Register a new user.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let (Some(username), Some(email), Some(password)) = (
        required(body.username.as_ref()),
        required(body.email.as_ref()),
        body.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::BadRequest("All fields are required".into()));
    };

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }

    let password_hash = hash_password_blocking(password.to_owned())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let user = User::new(username, email, password_hash)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let user = state.store.create_user(user).map_err(|e| match e {
        devgenius_store::StoreError::Conflict(_) => {
            ApiError::Conflict("User already exists".into())
        }
        other => other.into(),
    })?;

    let token = issue_token(&state.config.jwt_secret, &user)?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            message: "User registered successfully".into(),
            token,
            user: PublicUser::from(&user),
        }),
    ))
}

/// Log in with email and password.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let (Some(email), Some(password)) = (
        required(body.email.as_ref()),
        body.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::BadRequest("Email and password are required".into()));
    };

    let user = state
        .store
        .find_user_by_email(email)?
        .ok_or(ApiError::InvalidCredentials)?;

    let valid = verify_password_blocking(user.password_hash.clone(), password.to_owned())
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(user_id = %user.id, error = %e, "Password check failed");
            false
        });
    if !valid {
        tracing::debug!(user_id = %user.id, "Login rejected");
        return Err(ApiError::InvalidCredentials);
    }

    let token = issue_token(&state.config.jwt_secret, &user)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(SessionResponse {
        message: "Login successful".into(),
        token,
        user: PublicUser::from(&user),
    }))
}
