//! Payment handlers.
//!
//! A payment is a pending transaction for a priced plan. It is completed
//! either by the paying user (`/verify`) or by the provider's signed
//! callback, and completion activates the plan.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use devgenius_core::{PaymentTransaction, PlanId, Subscription, TransactionId};
use devgenius_store::{Store, StoreError};

use crate::auth::AuthUser;
use crate::crypto::{constant_time_eq, hmac_sha256_hex};
use crate::error::ApiError;
use crate::extract::Json;
use crate::state::AppState;

/// Header carrying the callback signature.
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Create-payment request.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    /// Plan being bought.
    pub plan_id: String,
    /// Amount in minor units. Defaults to the plan price.
    #[serde(default)]
    pub amount: Option<i64>,
}

/// Request naming a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    /// Transaction to act on.
    pub transaction_id: String,
}

/// A transaction and its currency.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// The transaction.
    pub transaction: PaymentTransaction,
    /// Currency of the plan.
    pub currency: String,
}

/// Completed payment response.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    /// Always true.
    pub success: bool,
    /// The completed transaction.
    pub transaction: PaymentTransaction,
    /// The activated subscription.
    pub subscription: Subscription,
}

/// Callback acknowledgement.
#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    /// Whether the callback was accepted.
    pub received: bool,
    /// Whether the transaction had already been completed.
    pub already_processed: bool,
}

fn parse_transaction_id(raw: &str) -> Result<TransactionId, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::NotFound("Transaction not found".into()))
}

/// Load a transaction owned by the caller.
fn owned_transaction(
    state: &AppState,
    auth: &AuthUser,
    id: &TransactionId,
) -> Result<PaymentTransaction, ApiError> {
    let transaction = state
        .store
        .get_transaction(id)?
        .ok_or_else(|| ApiError::NotFound("Transaction not found".into()))?;

    if transaction.user_id != auth.user_id {
        tracing::warn!(
            user_id = %auth.user_id,
            transaction_id = %id,
            "Transaction access denied"
        );
        return Err(ApiError::Forbidden);
    }

    Ok(transaction)
}

/// Create a pending payment for a priced plan.
pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), ApiError> {
    let plan_id: PlanId = body
        .plan_id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid plan id".into()))?;
    let plan = state
        .store
        .get_plan(&plan_id)?
        .ok_or_else(|| ApiError::NotFound(format!("plan not found: {plan_id}")))?;

    if !plan.is_paid() {
        return Err(ApiError::BadRequest("Free plans do not need a payment".into()));
    }

    let amount = body.amount.unwrap_or(plan.price);
    if amount <= 0 {
        return Err(ApiError::BadRequest("Invalid amount".into()));
    }
    if amount < plan.price {
        return Err(ApiError::BadRequest(format!(
            "Amount does not cover the plan price of {}",
            plan.price
        )));
    }

    let transaction = PaymentTransaction::pending(auth.user_id, plan.id.clone(), amount);
    state.store.create_transaction(&transaction)?;

    tracing::info!(
        user_id = %auth.user_id,
        transaction_id = %transaction.id,
        plan_id = %plan.id,
        amount,
        "Payment created"
    );

    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse {
            transaction,
            currency: plan.currency,
        }),
    ))
}

/// Get one of the caller's transactions.
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(transaction_id): Path<String>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let id = parse_transaction_id(&transaction_id)?;
    let transaction = owned_transaction(&state, &auth, &id)?;
    let currency = state
        .store
        .get_plan(&transaction.plan_id)?
        .map_or_else(|| "USD".to_string(), |p| p.currency);

    Ok(Json(TransactionResponse {
        transaction,
        currency,
    }))
}

/// Complete the caller's pending payment and activate its plan.
pub async fn verify_payment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<TransactionRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let id = parse_transaction_id(&body.transaction_id)?;
    owned_transaction(&state, &auth, &id)?;

    let (transaction, subscription) = state
        .store
        .complete_transaction(&id, Utc::now())
        .map_err(|e| match e {
            StoreError::InvalidState(_) => {
                ApiError::BadRequest("Transaction already processed".into())
            }
            other => other.into(),
        })?;

    Ok(Json(VerifyResponse {
        success: true,
        transaction,
        subscription,
    }))
}

/// Provider callback completing a payment.
///
/// The body must be signed with the shared webhook secret: `X-Signature` is
/// the hex HMAC-SHA256 of the raw body.
pub async fn payment_callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CallbackResponse>, ApiError> {
    let secret = state
        .config
        .payment_webhook_secret
        .as_deref()
        .ok_or_else(|| ApiError::Internal("payment webhook secret not configured".into()))?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let expected = hmac_sha256_hex(secret, &body);
    if !constant_time_eq(expected.as_bytes(), signature.trim().to_ascii_lowercase().as_bytes()) {
        tracing::warn!("Invalid payment callback signature");
        return Err(ApiError::Unauthorized);
    }

    let request: TransactionRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let id = parse_transaction_id(&request.transaction_id)?;

    tracing::info!(transaction_id = %id, "Received payment callback");

    match state.store.complete_transaction(&id, Utc::now()) {
        Ok(_) => Ok(Json(CallbackResponse {
            received: true,
            already_processed: false,
        })),
        Err(StoreError::InvalidState(_)) => {
            tracing::debug!(transaction_id = %id, "Callback for completed transaction");
            Ok(Json(CallbackResponse {
                received: true,
                already_processed: true,
            }))
        }
        Err(e) => Err(e.into()),
    }
}
