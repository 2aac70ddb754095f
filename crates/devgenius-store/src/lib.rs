//! Flat-file JSON storage layer for DevGenius.
//!
//! All state lives in a single JSON document (see [`Document`]) that is read
//! and rewritten in full on every operation. There is no indexing: lookups are
//! linear scans over the loaded collections.
//!
//! # Consistency
//!
//! [`JsonFileStore`] serializes every read-modify-write behind one mutex, so
//! concurrent requests in the same process never lose each other's updates.
//! Separate processes sharing the file are not coordinated.
//!
//! # Example
//!
//! ```no_run
//! use chrono::Utc;
//! use devgenius_core::{QuotaPolicy, User};
//! use devgenius_store::{JsonFileStore, Store};
//!
//! let store = JsonFileStore::open("/tmp/devgenius/db.json").unwrap();
//!
//! let user = User::new("ada", "ada@example.com", "salt:key".into()).unwrap();
//! let user = store.create_user(user).unwrap();
//!
//! let decision = store
//!     .consume_message(&user.id, &QuotaPolicy::default(), Utc::now())
//!     .unwrap();
//! assert!(decision.is_admitted());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod document;
pub mod error;
pub mod file;

pub use document::Document;
pub use error::{Result, StoreError};
pub use file::JsonFileStore;

use chrono::{DateTime, Utc};
use devgenius_core::{
    MessageUsage, PaymentTransaction, Plan, PlanId, QuotaDecision, QuotaPolicy, Rating,
    Subscription, TransactionId, User, UserId,
};

/// A user's usage counter together with what it is measured against.
#[derive(Debug, Clone)]
pub struct UsageSnapshot {
    /// The counter, rolled to the current window.
    pub usage: MessageUsage,
    /// Limit for the current window.
    pub limit: u32,
    /// The plan behind the limit, if the user subscribes to one.
    pub plan: Option<Plan>,
    /// The user's current subscription.
    pub subscription: Option<Subscription>,
}

/// The storage trait defining all database operations.
///
/// Every method performs its own load/modify/save cycle.
pub trait Store: Send + Sync {
    // =========================================================================
    // Document
    // =========================================================================

    /// Load the whole document, creating a seeded one if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    fn load(&self) -> Result<Document>;

    /// Replace the whole document.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn save(&self, document: &Document) -> Result<()>;

    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the email is already registered.
    fn create_user(&self, user: User) -> Result<User>;

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    fn get_user(&self, user_id: &UserId) -> Result<Option<User>>;

    /// Find a user by email, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// List every user.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    fn list_users(&self) -> Result<Vec<User>>;

    /// Replace an existing user record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    fn update_user(&self, user: &User) -> Result<()>;

    // =========================================================================
    // Plans
    // =========================================================================

    /// List the plan catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    fn list_plans(&self) -> Result<Vec<Plan>>;

    /// Get a plan by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    fn get_plan(&self, plan_id: &PlanId) -> Result<Option<Plan>>;

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// The user's active, unexpired subscription.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    fn active_subscription(&self, user_id: &UserId, now: DateTime<Utc>)
        -> Result<Option<Subscription>>;

    /// Start a subscription, deactivating any other subscription of the user.
    ///
    /// A priced plan requires `transaction_id` to name a completed payment by
    /// the same user for the same plan.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the plan or transaction doesn't exist.
    /// - `StoreError::InvalidState` if the plan is inactive or the payment
    ///   doesn't cover it.
    fn activate_subscription(
        &self,
        user_id: &UserId,
        plan_id: &PlanId,
        transaction_id: Option<TransactionId>,
        now: DateTime<Utc>,
    ) -> Result<Subscription>;

    // =========================================================================
    // Payment Transactions
    // =========================================================================

    /// Insert a transaction.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the id is already taken.
    fn create_transaction(&self, transaction: &PaymentTransaction) -> Result<()>;

    /// Get a transaction by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    fn get_transaction(&self, transaction_id: &TransactionId)
        -> Result<Option<PaymentTransaction>>;

    /// Mark a pending transaction completed and activate its plan.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the transaction or its plan doesn't exist.
    /// - `StoreError::InvalidState` if the transaction is already completed.
    fn complete_transaction(
        &self,
        transaction_id: &TransactionId,
        now: DateTime<Utc>,
    ) -> Result<(PaymentTransaction, Subscription)>;

    // =========================================================================
    // Message Usage
    // =========================================================================

    /// Admit one message if the user is under their limit, persisting the
    /// incremented counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded or saved.
    fn consume_message(
        &self,
        user_id: &UserId,
        policy: &QuotaPolicy,
        now: DateTime<Utc>,
    ) -> Result<QuotaDecision>;

    /// The user's counter rolled to the current window, with its limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded or saved.
    fn usage_snapshot(
        &self,
        user_id: &UserId,
        policy: &QuotaPolicy,
        now: DateTime<Utc>,
    ) -> Result<UsageSnapshot>;

    /// Increment the user's counter without checking the limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded or saved.
    fn record_message(
        &self,
        user_id: &UserId,
        policy: &QuotaPolicy,
        now: DateTime<Utc>,
    ) -> Result<MessageUsage>;

    /// Zero the user's counter and restart its window at `now`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user does not exist, or an error
    /// if the document cannot be loaded or saved.
    fn reset_usage(
        &self,
        user_id: &UserId,
        policy: &QuotaPolicy,
        now: DateTime<Utc>,
    ) -> Result<MessageUsage>;

    // =========================================================================
    // Ratings
    // =========================================================================

    /// Store a rating.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the user already rated.
    fn add_rating(&self, rating: Rating) -> Result<Rating>;

    /// List every rating, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    fn list_ratings(&self) -> Result<Vec<Rating>>;

    /// The user's rating, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    fn rating_for(&self, user_id: &UserId) -> Result<Option<Rating>>;
}
