//! Plan catalog and subscription handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use devgenius_core::{Plan, PlanId, Subscription, TransactionId, UserId};
use devgenius_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::Json;
use crate::state::AppState;

/// A subscription together with its plan.
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    /// The subscription record.
    pub subscription: Subscription,
    /// The subscribed plan, if it still exists in the catalog.
    pub plan: Option<Plan>,
}

/// Subscribe request.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    /// Plan to subscribe to.
    pub plan_id: String,
    /// Completed payment for a priced plan.
    #[serde(default)]
    pub transaction_id: Option<String>,
}

fn parse_plan_id(raw: &str) -> Result<PlanId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound(format!("plan not found: {raw}")))
}

/// List the plan catalog.
pub async fn list_plans(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Plan>>, ApiError> {
    Ok(Json(state.store.list_plans()?))
}

/// Get one plan.
pub async fn get_plan(
    State(state): State<Arc<AppState>>,
    Path(plan_id): Path<String>,
) -> Result<Json<Plan>, ApiError> {
    let id = parse_plan_id(&plan_id)?;
    let plan = state
        .store
        .get_plan(&id)?
        .ok_or_else(|| ApiError::NotFound(format!("plan not found: {plan_id}")))?;

    Ok(Json(plan))
}

/// Subscribe the caller to a plan.
///
/// Free plans activate directly. Priced plans need a completed transaction
/// the caller made for that plan.
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), ApiError> {
    let plan_id = parse_plan_id(&body.plan_id)?;
    let transaction_id = body
        .transaction_id
        .as_deref()
        .map(str::parse::<TransactionId>)
        .transpose()
        .map_err(|_| ApiError::BadRequest("Invalid transaction id".into()))?;

    let subscription = state.store.activate_subscription(
        &auth.user_id,
        &plan_id,
        transaction_id,
        Utc::now(),
    )?;
    let plan = state.store.get_plan(&plan_id)?;

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionResponse { subscription, plan }),
    ))
}

/// Get a user's current subscription. Callers may only read their own.
pub async fn get_subscription(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let user_id: UserId = user_id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid user id".into()))?;
    if user_id != auth.user_id {
        return Err(ApiError::Forbidden);
    }

    let subscription = state
        .store
        .active_subscription(&user_id, Utc::now())?
        .ok_or_else(|| ApiError::NotFound("No active subscription found".into()))?;
    let plan = state.store.get_plan(&subscription.plan_id)?;

    Ok(Json(SubscriptionResponse { subscription, plan }))
}
