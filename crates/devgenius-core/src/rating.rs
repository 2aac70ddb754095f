//! Star ratings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::{RatingId, UserId};

/// A 1–5 star score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Stars(u8);

impl Stars {
    /// Lowest allowed score.
    pub const MIN: u8 = 1;
    /// Highest allowed score.
    pub const MAX: u8 = 5;

    /// The score as an integer.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Stars {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u8::try_from(value) {
            Ok(v) if (Self::MIN..=Self::MAX).contains(&v) => Ok(Self(v)),
            _ => Err(CoreError::InvalidRating(value)),
        }
    }
}

impl From<Stars> for u8 {
    fn from(stars: Stars) -> Self {
        stars.0
    }
}

/// A user's rating of the product. At most one per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    /// Unique rating ID.
    pub id: RatingId,
    /// Rating author.
    pub user_id: UserId,
    /// The score.
    pub stars: Stars,
    /// When the rating was submitted.
    pub created_at: DateTime<Utc>,
}

impl Rating {
    /// Create a rating stamped with the current time.
    #[must_use]
    pub fn new(user_id: UserId, stars: Stars) -> Self {
        Self {
            id: RatingId::generate(),
            user_id,
            stars,
            created_at: Utc::now(),
        }
    }
}

/// Mean star score; `0.0` when there are no ratings.
#[must_use]
pub fn average_stars(ratings: &[Rating]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let total: u32 = ratings.iter().map(|r| u32::from(r.stars.get())).sum();
    f64::from(total) / f64::from(u32::try_from(ratings.len()).unwrap_or(u32::MAX))
}
