//! User account types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::UserId;

/// Credits granted to every new user at registration.
pub const INITIAL_CREDITS: i64 = 15;

/// A registered user.
///
/// The password is stored only as a hash; see `PublicUser` for the shape
/// returned over the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,

    /// Display name.
    pub username: String,

    /// Email address, unique case-insensitively.
    pub email: String,

    /// Password hash (`salt:key`, hex encoded).
    pub password_hash: String,

    /// Credit balance shown to the user.
    pub credits: i64,

    /// When the credit balance was last reset.
    pub last_credit_reset: DateTime<Utc>,

    /// When the user registered.
    pub created_at: DateTime<Utc>,

    /// When the user record last changed.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the initial credit grant.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MissingField` if the username or email is blank.
    pub fn new(username: &str, email: &str, password_hash: String) -> Result<Self> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() {
            return Err(CoreError::MissingField("username"));
        }
        if email.is_empty() {
            return Err(CoreError::MissingField("email"));
        }

        let now = Utc::now();
        Ok(Self {
            id: UserId::generate(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            credits: INITIAL_CREDITS,
            last_credit_reset: now,
            created_at: now,
            updated_at: now,
        })
    }

    /// Case-insensitive email match.
    #[must_use]
    pub fn has_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }
}

/// The user fields safe to return to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Credit balance.
    pub credits: i64,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            credits: user.credits,
        }
    }
}
