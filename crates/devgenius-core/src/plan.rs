//! Subscription plan types.
//!
//! Plans are reference data stored in the document. A fresh document is seeded
//! with `default_catalog()`.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::PlanId;

// ============================================================================
// Constants
// ============================================================================

/// Slug of the free tier.
pub const FREE_PLAN_ID: &str = "free";

/// Slug of the paid tier.
pub const PRO_PLAN_ID: &str = "pro";

/// Messages per quota period on the free tier.
pub const FREE_PLAN_MESSAGES: u32 = 15;

/// Messages per quota period on the pro tier.
pub const PRO_PLAN_MESSAGES: u32 = 100;

/// Pro plan price in minor units ($9.99).
pub const PRO_PLAN_PRICE: i64 = 999;

/// A subscription plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Plan slug.
    pub id: PlanId,

    /// Display name.
    pub name: String,

    /// Price in minor currency units.
    pub price: i64,

    /// ISO currency code.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Billing period.
    #[serde(default)]
    pub period: PlanPeriod,

    /// Marketing description.
    #[serde(default)]
    pub description: String,

    /// Feature bullet points.
    #[serde(default)]
    pub features: Vec<String>,

    /// Messages allowed per quota period.
    pub message_quota: u32,

    /// Highlighted in the catalog.
    #[serde(default)]
    pub popular: bool,

    /// Whether the plan can be subscribed to.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_active() -> bool {
    true
}

impl Plan {
    /// Whether subscribing requires a completed payment.
    #[must_use]
    pub const fn is_paid(&self) -> bool {
        self.price > 0
    }
}

/// How often a plan bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanPeriod {
    /// Billed every month.
    #[default]
    Monthly,
    /// Billed every year.
    Yearly,
    /// Never expires.
    Forever,
}

impl PlanPeriod {
    /// Length of one paid term, or `None` for plans that never expire.
    #[must_use]
    pub fn term(self) -> Option<Duration> {
        match self {
            Self::Monthly => Some(Duration::days(30)),
            Self::Yearly => Some(Duration::days(365)),
            Self::Forever => None,
        }
    }
}

/// The built-in plan catalog used to seed a new document.
#[must_use]
pub fn default_catalog() -> Vec<Plan> {
    vec![
        Plan {
            id: PlanId::from_static(FREE_PLAN_ID),
            name: "Free".to_string(),
            price: 0,
            currency: default_currency(),
            period: PlanPeriod::Forever,
            description: "Try DevGenius with a small message allowance".to_string(),
            features: vec![
                format!("{FREE_PLAN_MESSAGES} AI requests per quota window"),
                "Community support".to_string(),
            ],
            message_quota: FREE_PLAN_MESSAGES,
            popular: false,
            active: true,
        },
        Plan {
            id: PlanId::from_static(PRO_PLAN_ID),
            name: "Pro".to_string(),
            price: PRO_PLAN_PRICE,
            currency: default_currency(),
            period: PlanPeriod::Monthly,
            description: "For developers who lean on the assistant every day".to_string(),
            features: vec![
                format!("{PRO_PLAN_MESSAGES} AI requests per quota window"),
                "Priority support".to_string(),
            ],
            message_quota: PRO_PLAN_MESSAGES,
            popular: true,
            active: true,
        },
    ]
}
