//! JSON file storage implementation.
//!
//! This module provides the `JsonFileStore` implementation of the `Store` trait.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use devgenius_core::{
    default_catalog, MessageUsage, PaymentTransaction, Plan, PlanId, QuotaDecision, QuotaPolicy,
    Rating, Subscription, SubscriptionStatus, TransactionId, User, UserId,
};

use crate::document::Document;
use crate::error::{Result, StoreError};
use crate::{Store, UsageSnapshot};

/// Storage backed by one JSON file.
pub struct JsonFileStore {
    path: PathBuf,
    /// Held for the whole load/modify/save cycle.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the document at `path`, creating it (and its parent directories)
    /// if it does not exist. A document without plans is seeded with the
    /// built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created, read or parsed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let store = Self {
            path,
            write_lock: Mutex::new(()),
        };

        store.transact(|doc| {
            if doc.plans.is_empty() {
                tracing::info!(path = %store.path.display(), "Seeding plan catalog");
                doc.plans = default_catalog();
            }
            Ok::<_, StoreError>(())
        })?;

        Ok(store)
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, apply `f`, and save it if `f` succeeded.
    ///
    /// The whole cycle runs under the store's lock.
    ///
    /// # Errors
    ///
    /// Returns `f`'s error, or a `StoreError` if loading or saving fails.
    pub fn transact<T, E>(
        &self,
        f: impl FnOnce(&mut Document) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        E: From<StoreError>,
    {
        let _guard = self.lock();
        let mut doc = self.read_file()?;
        let out = f(&mut doc)?;
        self.write_file(&doc)?;
        Ok(out)
    }

    /// Load the document and inspect it without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn read<T>(&self, f: impl FnOnce(&Document) -> T) -> Result<T> {
        let _guard = self.lock();
        let doc = self.read_file()?;
        Ok(f(&doc))
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a panic mid-cycle leaves nothing to repair.
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_file(&self) -> Result<Document> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "Creating new document");
                let doc = Document::seeded();
                self.write_file(&doc)?;
                Ok(doc)
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Document read failed");
                Err(e.into())
            }
        }
    }

    fn write_file(&self, doc: &Document) -> Result<()> {
        let data = serde_json::to_vec_pretty(doc)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "Document write failed");
            StoreError::from(e)
        })
    }
}

/// Flip every other subscription of the user to inactive and append `sub`.
fn replace_subscription(doc: &mut Document, sub: &Subscription) {
    for existing in doc
        .subscriptions
        .iter_mut()
        .filter(|s| s.user_id == sub.user_id && s.status == SubscriptionStatus::Active)
    {
        existing.status = SubscriptionStatus::Inactive;
    }
    doc.subscriptions.push(sub.clone());
}

impl Store for JsonFileStore {
    // =========================================================================
    // Document
    // =========================================================================

    fn load(&self) -> Result<Document> {
        let _guard = self.lock();
        self.read_file()
    }

    fn save(&self, document: &Document) -> Result<()> {
        let _guard = self.lock();
        self.write_file(document)
    }

    // =========================================================================
    // Users
    // =========================================================================

    fn create_user(&self, user: User) -> Result<User> {
        self.transact(|doc| {
            if doc.user_by_email(&user.email).is_some() {
                return Err(StoreError::Conflict(format!(
                    "email already registered: {}",
                    user.email
                )));
            }
            doc.users.push(user.clone());
            Ok(user)
        })
    }

    fn get_user(&self, user_id: &UserId) -> Result<Option<User>> {
        self.read(|doc| doc.user(user_id).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.read(|doc| doc.user_by_email(email).cloned())
    }

    fn list_users(&self) -> Result<Vec<User>> {
        self.read(|doc| doc.users.clone())
    }

    fn update_user(&self, user: &User) -> Result<()> {
        self.transact(|doc| {
            let slot = doc
                .users
                .iter_mut()
                .find(|u| u.id == user.id)
                .ok_or_else(|| StoreError::not_found("user", user.id))?;
            *slot = User {
                updated_at: Utc::now(),
                ..user.clone()
            };
            Ok(())
        })
    }

    // =========================================================================
    // Plans
    // =========================================================================

    fn list_plans(&self) -> Result<Vec<Plan>> {
        self.read(|doc| doc.plans.clone())
    }

    fn get_plan(&self, plan_id: &PlanId) -> Result<Option<Plan>> {
        self.read(|doc| doc.plan(plan_id).cloned())
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    fn active_subscription(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<Subscription>> {
        self.read(|doc| doc.current_subscription(user_id, now).cloned())
    }

    fn activate_subscription(
        &self,
        user_id: &UserId,
        plan_id: &PlanId,
        transaction_id: Option<TransactionId>,
        now: DateTime<Utc>,
    ) -> Result<Subscription> {
        self.transact(|doc| {
            let plan = doc
                .plan(plan_id)
                .cloned()
                .ok_or_else(|| StoreError::not_found("plan", plan_id))?;
            if !plan.active {
                return Err(StoreError::InvalidState(format!("plan {plan_id} is not available")));
            }

            if plan.is_paid() {
                let tx_id = transaction_id.ok_or_else(|| {
                    StoreError::InvalidState(format!("plan {plan_id} requires a completed payment"))
                })?;
                let tx = doc.transaction(&tx_id).ok_or_else(|| {
                    StoreError::InvalidState(format!("transaction {tx_id} does not exist"))
                })?;
                if tx.user_id != *user_id || tx.plan_id != *plan_id || !tx.is_completed() {
                    return Err(StoreError::InvalidState(format!(
                        "transaction {tx_id} does not pay for plan {plan_id}"
                    )));
                }
            }

            let sub = Subscription::start(*user_id, &plan, transaction_id, now);
            replace_subscription(doc, &sub);

            tracing::info!(
                user_id = %user_id,
                plan_id = %plan_id,
                subscription_id = %sub.id,
                "Subscription activated"
            );

            Ok(sub)
        })
    }

    // =========================================================================
    // Payment Transactions
    // =========================================================================

    fn create_transaction(&self, transaction: &PaymentTransaction) -> Result<()> {
        self.transact(|doc| {
            if doc.transaction(&transaction.id).is_some() {
                return Err(StoreError::Conflict(format!(
                    "transaction already exists: {}",
                    transaction.id
                )));
            }
            doc.transactions.push(transaction.clone());
            Ok(())
        })
    }

    fn get_transaction(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<PaymentTransaction>> {
        self.read(|doc| doc.transaction(transaction_id).cloned())
    }

    fn complete_transaction(
        &self,
        transaction_id: &TransactionId,
        now: DateTime<Utc>,
    ) -> Result<(PaymentTransaction, Subscription)> {
        self.transact(|doc| {
            let index = doc
                .transactions
                .iter()
                .position(|t| t.id == *transaction_id)
                .ok_or_else(|| StoreError::not_found("transaction", transaction_id))?;

            if doc.transactions[index].is_completed() {
                return Err(StoreError::InvalidState(format!(
                    "transaction {transaction_id} already processed"
                )));
            }

            let plan_id = doc.transactions[index].plan_id.clone();
            let plan = doc
                .plan(&plan_id)
                .cloned()
                .ok_or_else(|| StoreError::not_found("plan", &plan_id))?;

            doc.transactions[index].complete(now);
            let tx = doc.transactions[index].clone();

            let sub = Subscription::start(tx.user_id, &plan, Some(tx.id), now);
            replace_subscription(doc, &sub);

            tracing::info!(
                user_id = %tx.user_id,
                transaction_id = %tx.id,
                plan_id = %plan_id,
                amount = %tx.amount,
                "Payment completed"
            );

            Ok((tx, sub))
        })
    }

    // =========================================================================
    // Message Usage
    // =========================================================================

    fn consume_message(
        &self,
        user_id: &UserId,
        policy: &QuotaPolicy,
        now: DateTime<Utc>,
    ) -> Result<QuotaDecision> {
        self.transact(|doc| {
            let limit = doc.quota_limit(user_id, policy, now);
            let decision = doc.usage_mut(*user_id, policy, now).admit(limit, policy.period, now);
            doc.sync_credits(user_id, policy, now);
            Ok(decision)
        })
    }

    fn usage_snapshot(
        &self,
        user_id: &UserId,
        policy: &QuotaPolicy,
        now: DateTime<Utc>,
    ) -> Result<UsageSnapshot> {
        self.transact(|doc| {
            let usage = doc.usage_mut(*user_id, policy, now).clone();
            doc.sync_credits(user_id, policy, now);
            Ok(UsageSnapshot {
                usage,
                limit: doc.quota_limit(user_id, policy, now),
                plan: doc.current_plan(user_id, now).cloned(),
                subscription: doc.current_subscription(user_id, now).cloned(),
            })
        })
    }

    fn record_message(
        &self,
        user_id: &UserId,
        policy: &QuotaPolicy,
        now: DateTime<Utc>,
    ) -> Result<MessageUsage> {
        self.transact(|doc| {
            let usage = doc.usage_mut(*user_id, policy, now);
            usage.count = usage.count.saturating_add(1);
            let usage = usage.clone();
            doc.sync_credits(user_id, policy, now);
            Ok(usage)
        })
    }

    fn reset_usage(
        &self,
        user_id: &UserId,
        policy: &QuotaPolicy,
        now: DateTime<Utc>,
    ) -> Result<MessageUsage> {
        self.transact(|doc| {
            if doc.user(user_id).is_none() {
                return Err(StoreError::not_found("user", user_id));
            }
            let usage = doc.usage_mut(*user_id, policy, now);
            usage.count = 0;
            usage.last_reset = now;
            let usage = usage.clone();
            doc.sync_credits(user_id, policy, now);

            tracing::info!(user_id = %user_id, "Message usage reset");
            Ok(usage)
        })
    }

    // =========================================================================
    // Ratings
    // =========================================================================

    fn add_rating(&self, rating: Rating) -> Result<Rating> {
        self.transact(|doc| {
            if doc.ratings.iter().any(|r| r.user_id == rating.user_id) {
                return Err(StoreError::Conflict(format!(
                    "user {} has already rated",
                    rating.user_id
                )));
            }
            doc.ratings.push(rating.clone());
            Ok(rating)
        })
    }

    fn list_ratings(&self) -> Result<Vec<Rating>> {
        self.read(|doc| doc.ratings.clone())
    }

    fn rating_for(&self, user_id: &UserId) -> Result<Option<Rating>> {
        self.read(|doc| doc.ratings.iter().find(|r| r.user_id == *user_id).cloned())
    }
}
