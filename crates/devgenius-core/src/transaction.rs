//! Payment transaction types.
//!
//! There is no payment provider integration: a transaction is created as
//! `Pending` when checkout starts and flipped to `Completed` once the payment is
//! confirmed by the user or by the provider callback.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PlanId, TransactionId, UserId};

/// A payment for a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTransaction {
    /// Unique transaction ID (ULID for time-ordering).
    pub id: TransactionId,

    /// Paying user.
    pub user_id: UserId,

    /// Plan being paid for.
    pub plan_id: PlanId,

    /// Amount in minor currency units.
    pub amount: i64,

    /// Current status.
    pub status: TransactionStatus,

    /// When checkout started.
    pub created_at: DateTime<Utc>,

    /// When the payment was confirmed.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl PaymentTransaction {
    /// Create a pending transaction.
    #[must_use]
    pub fn pending(user_id: UserId, plan_id: PlanId, amount: i64) -> Self {
        Self {
            id: TransactionId::generate(),
            user_id,
            plan_id,
            amount,
            status: TransactionStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Mark the transaction completed at `now`.
    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.status = TransactionStatus::Completed;
        self.completed_at = Some(now);
    }

    /// Whether the payment has been confirmed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}

/// Status of a payment transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Checkout started, payment not confirmed.
    Pending,
    /// Payment confirmed.
    Completed,
}
