//! Core types and utilities for the DevGenius backend.
//!
//! This crate provides the domain types shared by the store and the HTTP service:
//!
//! - **Identifiers**: `UserId`, `SubscriptionId`, `RatingId`, `TransactionId`, `PlanId`
//! - **Users**: `User`, `PublicUser`
//! - **Plans**: `Plan`, `PlanPeriod`, the built-in catalog
//! - **Subscriptions**: `Subscription`, `SubscriptionStatus`
//! - **Payments**: `PaymentTransaction`, `TransactionStatus`
//! - **Usage**: `MessageUsage`, `QuotaPeriod`, `QuotaPolicy`, `QuotaDecision`
//! - **Ratings**: `Rating`, `Stars`
//!
//! # Message quota
//!
//! Every call to the AI proxy consumes one message from the caller's quota.
//! The quota window is a UTC calendar day or month, chosen once by
//! configuration, and the limit comes from the caller's active plan.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod plan;
pub mod rating;
pub mod subscription;
pub mod transaction;
pub mod usage;
pub mod user;

pub use error::{CoreError, Result};
pub use ids::{IdError, PlanId, RatingId, SubscriptionId, TransactionId, UserId};
pub use plan::{
    default_catalog, Plan, PlanPeriod, FREE_PLAN_ID, FREE_PLAN_MESSAGES, PRO_PLAN_ID,
    PRO_PLAN_MESSAGES, PRO_PLAN_PRICE,
};
pub use rating::{average_stars, Rating, Stars};
pub use subscription::{Subscription, SubscriptionStatus};
pub use transaction::{PaymentTransaction, TransactionStatus};
pub use usage::{MessageUsage, QuotaDecision, QuotaPeriod, QuotaPolicy};
pub use user::{PublicUser, User, INITIAL_CREDITS};
