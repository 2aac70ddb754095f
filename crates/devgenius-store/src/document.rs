//! The persisted document.
//!
//! All state lives in one JSON object. Every collection defaults to empty so
//! that files written by older versions, or edited by hand, still load.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use devgenius_core::{
    default_catalog, MessageUsage, PaymentTransaction, Plan, PlanId, QuotaPolicy, Rating,
    Subscription, TransactionId, User, UserId, FREE_PLAN_ID,
};

/// The whole database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Registered users.
    #[serde(default)]
    pub users: Vec<User>,

    /// Plan catalog.
    #[serde(default)]
    pub plans: Vec<Plan>,

    /// Subscriptions, current and past.
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,

    /// Payment transactions.
    #[serde(default)]
    pub transactions: Vec<PaymentTransaction>,

    /// Message counters keyed by user.
    #[serde(default)]
    pub message_usage: BTreeMap<UserId, MessageUsage>,

    /// Product ratings.
    #[serde(default)]
    pub ratings: Vec<Rating>,
}

impl Document {
    /// An empty document seeded with the built-in plan catalog.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            plans: default_catalog(),
            ..Self::default()
        }
    }

    /// Look up a user by id.
    #[must_use]
    pub fn user(&self, user_id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == *user_id)
    }

    /// Look up a user by email, ignoring case.
    #[must_use]
    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.has_email(email))
    }

    /// Look up a plan by id.
    #[must_use]
    pub fn plan(&self, plan_id: &PlanId) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id == *plan_id)
    }

    /// Look up a transaction by id.
    #[must_use]
    pub fn transaction(&self, transaction_id: &TransactionId) -> Option<&PaymentTransaction> {
        self.transactions.iter().find(|t| t.id == *transaction_id)
    }

    /// The user's subscription that is active and unexpired at `now`.
    #[must_use]
    pub fn current_subscription(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Option<&Subscription> {
        self.subscriptions
            .iter()
            .find(|s| s.user_id == *user_id && s.is_current(now))
    }

    /// The plan that governs the user's quota at `now`, if they subscribe to one.
    #[must_use]
    pub fn current_plan(&self, user_id: &UserId, now: DateTime<Utc>) -> Option<&Plan> {
        self.current_subscription(user_id, now)
            .and_then(|s| self.plan(&s.plan_id))
    }

    /// Message limit for the user's current window.
    #[must_use]
    pub fn quota_limit(&self, user_id: &UserId, policy: &QuotaPolicy, now: DateTime<Utc>) -> u32 {
        self.current_plan(user_id, now)
            .map_or(policy.free_limit, |plan| plan.message_quota)
    }

    /// The user's counter, created on first use and rolled to the current window.
    pub fn usage_mut(
        &mut self,
        user_id: UserId,
        policy: &QuotaPolicy,
        now: DateTime<Utc>,
    ) -> &mut MessageUsage {
        let plan_id = self
            .current_plan(&user_id, now)
            .map_or_else(|| PlanId::from_static(FREE_PLAN_ID), |p| p.id.clone());

        let usage = self
            .message_usage
            .entry(user_id)
            .or_insert_with(|| MessageUsage::new(now));
        usage.roll_over(policy.period, now);
        usage.plan_id = plan_id;
        usage
    }

    /// Mirror the user's remaining messages onto their profile balance.
    pub fn sync_credits(&mut self, user_id: &UserId, policy: &QuotaPolicy, now: DateTime<Utc>) {
        let limit = self.quota_limit(user_id, policy, now);
        let Some(usage) = self.message_usage.get(user_id) else {
            return;
        };
        let (remaining, last_reset) = (limit.saturating_sub(usage.count), usage.last_reset);

        if let Some(user) = self.users.iter_mut().find(|u| u.id == *user_id) {
            user.credits = i64::from(remaining);
            user.last_credit_reset = last_reset;
        }
    }
}
