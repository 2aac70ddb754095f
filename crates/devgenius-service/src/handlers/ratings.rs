//! Product rating handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use devgenius_core::{average_stars, Rating, Stars};
use devgenius_store::{Store, StoreError};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::Json;
use crate::state::AppState;

/// Submit-rating request.
#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    /// Score, 1 to 5.
    pub rating: i64,
}

/// Average rating response.
#[derive(Debug, Serialize)]
pub struct AverageResponse {
    /// Mean score, 0 when there are no ratings.
    pub average: f64,
    /// Number of ratings.
    pub count: usize,
}

/// All ratings response.
#[derive(Debug, Serialize)]
pub struct RatingsResponse {
    /// Scores in submission order.
    pub ratings: Vec<u8>,
}

/// Submit the caller's rating. Each user may rate once.
pub async fn submit_rating(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<RatingRequest>,
) -> Result<(StatusCode, Json<Rating>), ApiError> {
    let stars = Stars::try_from(body.rating)
        .map_err(|_| ApiError::BadRequest("Rating must be between 1 and 5".into()))?;

    let rating = state
        .store
        .add_rating(Rating::new(auth.user_id, stars))
        .map_err(|e| match e {
            StoreError::Conflict(_) => ApiError::Conflict("You have already rated".into()),
            other => other.into(),
        })?;

    tracing::info!(user_id = %auth.user_id, stars = stars.get(), "Rating submitted");

    Ok((StatusCode::CREATED, Json(rating)))
}

/// Average of all ratings.
pub async fn average(State(state): State<Arc<AppState>>) -> Result<Json<AverageResponse>, ApiError> {
    let ratings = state.store.list_ratings()?;

    Ok(Json(AverageResponse {
        average: average_stars(&ratings),
        count: ratings.len(),
    }))
}

/// Every rating's score.
pub async fn list_ratings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RatingsResponse>, ApiError> {
    let ratings = state.store.list_ratings()?;

    Ok(Json(RatingsResponse {
        ratings: ratings.iter().map(|r| r.stars.get()).collect(),
    }))
}

/// The caller's own rating.
pub async fn my_rating(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Rating>, ApiError> {
    state
        .store
        .rating_for(&auth.user_id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("You have not rated yet".into()))
}
