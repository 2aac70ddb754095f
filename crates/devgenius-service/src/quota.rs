//! Message quota gate.
//!
//! Every AI call passes through [`enforce`] before the upstream request is
//! made. The counter is bumped and persisted atomically by the store, and an
//! admitted message is not refunded if the upstream call later fails.

use chrono::Utc;

use devgenius_core::QuotaDecision;
use devgenius_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Messages left after an admitted call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Limit for the window.
    pub limit: u32,
    /// Messages used including this one.
    pub used: u32,
    /// Messages left.
    pub remaining: u32,
}

/// Consume one message for the caller or fail with `ApiError::QuotaExceeded`.
///
/// # Errors
///
/// - `ApiError::QuotaExceeded` if the caller's limit is already reached.
/// - `ApiError::Internal` if the store fails.
pub fn enforce(state: &AppState, auth: &AuthUser) -> Result<Admission, ApiError> {
    let decision = state
        .store
        .consume_message(&auth.user_id, &state.quota_policy(), Utc::now())?;

    match decision {
        QuotaDecision::Admitted {
            limit,
            used,
            remaining,
        } => {
            tracing::debug!(user_id = %auth.user_id, used, limit, "Message admitted");
            Ok(Admission {
                limit,
                used,
                remaining,
            })
        }
        QuotaDecision::Exceeded {
            limit,
            used,
            reset_at,
        } => {
            tracing::info!(
                user_id = %auth.user_id,
                used,
                limit,
                reset_at = %reset_at,
                "Message limit reached"
            );
            Err(ApiError::QuotaExceeded {
                limit,
                used,
                reset_at,
            })
        }
    }
}
