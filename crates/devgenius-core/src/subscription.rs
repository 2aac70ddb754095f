//! Subscription types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Plan, PlanId, SubscriptionId, TransactionId, UserId};

/// A user's subscription to a plan.
///
/// A user may accumulate several subscription records over time, but at most
/// one of them is `Active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique subscription ID.
    pub id: SubscriptionId,

    /// Subscribed user.
    pub user_id: UserId,

    /// Subscribed plan.
    pub plan_id: PlanId,

    /// Payment that paid for this subscription, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<TransactionId>,

    /// Current status.
    pub status: SubscriptionStatus,

    /// When the subscription was created.
    pub created_at: DateTime<Utc>,

    /// When the paid term ends; `None` for plans that never expire.
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Start an active subscription to `plan` beginning at `now`.
    #[must_use]
    pub fn start(
        user_id: UserId,
        plan: &Plan,
        transaction_id: Option<TransactionId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SubscriptionId::generate(),
            user_id,
            plan_id: plan.id.clone(),
            transaction_id,
            status: SubscriptionStatus::Active,
            created_at: now,
            current_period_end: plan.period.term().map(|term| now + term),
        }
    }

    /// Whether the subscription is active and its term has not ended at `now`.
    #[must_use]
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active
            && self.current_period_end.map_or(true, |end| now < end)
    }
}

/// Status of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Subscription is in effect.
    Active,
    /// Superseded or lapsed.
    Inactive,
}
