//! Message usage and the quota policy that gates the AI proxy.
//!
//! Each user has one `MessageUsage` counter. The counter belongs to a quota
//! window (a UTC calendar day or month, per `QuotaPeriod`) and is zeroed the
//! first time it is touched in a later window.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::plan::{FREE_PLAN_ID, FREE_PLAN_MESSAGES};
use crate::PlanId;

/// Calendar window after which a usage counter resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaPeriod {
    /// Resets at 00:00 UTC every day.
    #[default]
    Daily,
    /// Resets at 00:00 UTC on the first of every month.
    Monthly,
}

impl QuotaPeriod {
    /// Whether `a` and `b` fall in the same window.
    #[must_use]
    pub fn same_window(self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        match self {
            Self::Daily => a.date_naive() == b.date_naive(),
            Self::Monthly => a.year() == b.year() && a.month() == b.month(),
        }
    }

    /// Start of the window following the one that contains `from`.
    #[must_use]
    pub fn next_reset(self, from: DateTime<Utc>) -> DateTime<Utc> {
        let date = from.date_naive();
        let next = match self {
            Self::Daily => date.succ_opt(),
            Self::Monthly => {
                let (year, month) = if date.month() == 12 {
                    (date.year() + 1, 1)
                } else {
                    (date.year(), date.month() + 1)
                };
                NaiveDate::from_ymd_opt(year, month, 1)
            }
        };

        next.and_then(|d| d.and_hms_opt(0, 0, 0))
            .map_or(DateTime::<Utc>::MAX_UTC, |naive| Utc.from_utc_datetime(&naive))
    }

    /// The period name used in config and responses.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }
}

impl FromStr for QuotaPeriod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(Self::Daily),
            "monthly" | "month" => Ok(Self::Monthly),
            other => Err(CoreError::InvalidQuotaPeriod(other.to_string())),
        }
    }
}

impl fmt::Display for QuotaPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quota settings shared by every code path that reads or bumps a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    /// Reset window.
    pub period: QuotaPeriod,
    /// Limit for users without an active subscription.
    pub free_limit: u32,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            period: QuotaPeriod::Daily,
            free_limit: FREE_PLAN_MESSAGES,
        }
    }
}

/// Per-user message counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageUsage {
    /// Messages used in the current window.
    pub count: u32,

    /// When the current window's counter started.
    pub last_reset: DateTime<Utc>,

    /// Plan the user was on when the counter was last touched.
    pub plan_id: PlanId,
}

impl MessageUsage {
    /// A fresh counter on the free plan.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            count: 0,
            last_reset: now,
            plan_id: PlanId::from_static(FREE_PLAN_ID),
        }
    }

    /// Zero the counter if `now` is in a later window than `last_reset`.
    ///
    /// Returns `true` if the counter was reset.
    pub fn roll_over(&mut self, period: QuotaPeriod, now: DateTime<Utc>) -> bool {
        if period.same_window(self.last_reset, now) {
            return false;
        }
        self.count = 0;
        self.last_reset = now;
        true
    }

    /// Try to consume one message under `limit`.
    ///
    /// Reaching exactly the limit blocks the next call. A rejected call leaves
    /// the counter untouched.
    pub fn admit(&mut self, limit: u32, period: QuotaPeriod, now: DateTime<Utc>) -> QuotaDecision {
        self.roll_over(period, now);

        if self.count >= limit {
            return QuotaDecision::Exceeded {
                limit,
                used: self.count,
                reset_at: period.next_reset(self.last_reset),
            };
        }

        self.count += 1;
        QuotaDecision::Admitted {
            limit,
            used: self.count,
            remaining: limit - self.count,
        }
    }

    /// When the current window ends.
    #[must_use]
    pub fn reset_at(&self, period: QuotaPeriod) -> DateTime<Utc> {
        period.next_reset(self.last_reset)
    }
}

/// Outcome of a quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum QuotaDecision {
    /// The call may proceed; the counter was incremented.
    Admitted {
        /// Limit for the window.
        limit: u32,
        /// Messages used including this one.
        used: u32,
        /// Messages left in the window.
        remaining: u32,
    },
    /// The limit was already reached.
    Exceeded {
        /// Limit for the window.
        limit: u32,
        /// Messages used.
        used: u32,
        /// When the counter resets.
        reset_at: DateTime<Utc>,
    },
}

impl QuotaDecision {
    /// Whether the call was admitted.
    #[must_use]
    pub const fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn one_below_limit_is_admitted_then_blocked() {
        let now = at(2026, 3, 14, 9);
        let mut usage = MessageUsage::new(now);
        usage.count = 14;

        let first = usage.admit(15, QuotaPeriod::Daily, now);
        assert_eq!(
            first,
            QuotaDecision::Admitted {
                limit: 15,
                used: 15,
                remaining: 0
            }
        );
        assert_eq!(usage.count, 15);

        let second = usage.admit(15, QuotaPeriod::Daily, now);
        assert_eq!(
            second,
            QuotaDecision::Exceeded {
                limit: 15,
                used: 15,
                reset_at: at(2026, 3, 15, 0)
            }
        );
        assert_eq!(usage.count, 15);
    }

    #[test]
    fn zero_limit_blocks_everything() {
        let now = at(2026, 3, 14, 9);
        let mut usage = MessageUsage::new(now);
        assert!(!usage.admit(0, QuotaPeriod::Daily, now).is_admitted());
        assert_eq!(usage.count, 0);
    }

    #[test]
    fn daily_window_resets_once_per_day() {
        let mut usage = MessageUsage::new(at(2026, 3, 14, 23));
        usage.count = 7;

        let next_day = at(2026, 3, 15, 1);
        assert!(usage.roll_over(QuotaPeriod::Daily, next_day));
        assert_eq!(usage.count, 0);

        usage.admit(15, QuotaPeriod::Daily, next_day);
        usage.admit(15, QuotaPeriod::Daily, next_day + Duration::hours(5));
        assert!(!usage.roll_over(QuotaPeriod::Daily, next_day + Duration::hours(20)));
        assert_eq!(usage.count, 2);
    }

    #[test]
    fn monthly_window_ignores_day_changes() {
        let mut usage = MessageUsage::new(at(2026, 3, 1, 0));
        usage.count = 3;

        assert!(!usage.roll_over(QuotaPeriod::Monthly, at(2026, 3, 31, 23)));
        assert_eq!(usage.count, 3);
        assert!(usage.roll_over(QuotaPeriod::Monthly, at(2026, 4, 1, 0)));
        assert_eq!(usage.count, 0);
    }

    #[test]
    fn same_month_different_year_is_a_new_window() {
        let last = at(2025, 3, 14, 9);
        let now = at(2026, 3, 14, 9);
        assert!(!QuotaPeriod::Monthly.same_window(last, now));
        assert!(!QuotaPeriod::Daily.same_window(last, now));
    }

    #[test]
    fn next_reset_boundaries() {
        assert_eq!(
            QuotaPeriod::Daily.next_reset(at(2026, 2, 28, 13)),
            at(2026, 3, 1, 0)
        );
        assert_eq!(
            QuotaPeriod::Monthly.next_reset(at(2026, 12, 31, 23)),
            at(2027, 1, 1, 0)
        );
        assert_eq!(
            QuotaPeriod::Monthly.next_reset(at(2026, 1, 1, 0)),
            at(2026, 2, 1, 0)
        );
    }

    #[test]
    fn period_parses_config_values() {
        assert_eq!("Daily".parse::<QuotaPeriod>().unwrap(), QuotaPeriod::Daily);
        assert_eq!("month".parse::<QuotaPeriod>().unwrap(), QuotaPeriod::Monthly);
        assert!("weekly".parse::<QuotaPeriod>().is_err());
    }
}
