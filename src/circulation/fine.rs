//! Fine assessment
//!
//! A late fee accrues per day beyond a grace window after the due date;
//! damaged or lost books add a flat surcharge on top. Amounts are integer
//! VND.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::enums::{BookCondition, FineReason};

/// Fine rates, loaded from the circulation policy settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FinePolicy {
    /// Days past the due date before the late fee starts accruing
    pub grace_days: i64,
    /// Fee per chargeable day, VND
    pub late_fee_per_day: i64,
    /// Flat surcharge for a damaged book, VND
    pub damaged_surcharge: i64,
    /// Flat surcharge for a lost book, VND
    pub lost_surcharge: i64,
}

impl Default for FinePolicy {
    fn default() -> Self {
        Self {
            grace_days: 30,
            late_fee_per_day: 5_000,
            damaged_surcharge: 100_000,
            lost_surcharge: 200_000,
        }
    }
}

/// Result of assessing one return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FineAssessment {
    /// Whole days past the due date, never negative
    pub days_late: i64,
    pub late_fee: i64,
    pub surcharge: i64,
    pub total: i64,
    /// Dominant reason for the fine, absent when nothing is owed
    pub reason: Option<FineReason>,
}

impl FineAssessment {
    /// Whether the return flow must route through payment
    pub fn requires_payment(&self) -> bool {
        self.total > 0
    }
}

impl FinePolicy {
    /// Assess the fine for a return. Deterministic, no side effects.
    pub fn assess(
        &self,
        due_date: DateTime<Utc>,
        returned_date: DateTime<Utc>,
        condition: BookCondition,
    ) -> FineAssessment {
        // Early returns clamp to zero days late
        let days_late = (returned_date - due_date).num_days().max(0);

        let late_fee = if days_late > self.grace_days {
            (days_late - self.grace_days) * self.late_fee_per_day
        } else {
            0
        };

        let surcharge = match condition {
            BookCondition::Good => 0,
            BookCondition::Damaged => self.damaged_surcharge,
            BookCondition::Lost => self.lost_surcharge,
        };

        let reason = match condition {
            BookCondition::Lost => Some(FineReason::Lost),
            BookCondition::Damaged => Some(FineReason::Damaged),
            BookCondition::Good if late_fee > 0 => Some(FineReason::LateReturn),
            BookCondition::Good => None,
        };

        FineAssessment {
            days_late,
            late_fee,
            surcharge,
            total: late_fee + surcharge,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_within_grace_window_is_free() {
        let policy = FinePolicy::default();
        let a = policy.assess(date(2024, 1, 1), date(2024, 1, 20), BookCondition::Good);
        assert_eq!(a.days_late, 19);
        assert_eq!(a.total, 0);
        assert_eq!(a.reason, None);
        assert!(!a.requires_payment());
    }

    #[test]
    fn test_grace_boundary() {
        let policy = FinePolicy::default();
        // Exactly 30 days late: still free
        let a = policy.assess(date(2024, 1, 1), date(2024, 1, 31), BookCondition::Good);
        assert_eq!(a.days_late, 30);
        assert_eq!(a.late_fee, 0);
        // 31 days late: one chargeable day
        let a = policy.assess(date(2024, 1, 1), date(2024, 2, 1), BookCondition::Good);
        assert_eq!(a.days_late, 31);
        assert_eq!(a.late_fee, 5_000);
        assert_eq!(a.reason, Some(FineReason::LateReturn));
    }

    #[test]
    fn test_late_fee_past_grace() {
        let policy = FinePolicy::default();
        // 45 days late: 15 chargeable days
        let a = policy.assess(date(2024, 1, 1), date(2024, 2, 15), BookCondition::Good);
        assert_eq!(a.days_late, 45);
        assert_eq!(a.total, 75_000);
        assert!(a.requires_payment());
    }

    #[test]
    fn test_late_fee_monotonically_increasing() {
        let policy = FinePolicy::default();
        let mut previous = 0;
        for days in 31..90 {
            let returned = date(2024, 1, 1) + chrono::Duration::days(days);
            let a = policy.assess(date(2024, 1, 1), returned, BookCondition::Good);
            assert!(a.late_fee > previous);
            previous = a.late_fee;
        }
    }

    #[test]
    fn test_early_return_clamps_to_zero() {
        let policy = FinePolicy::default();
        let a = policy.assess(date(2024, 1, 10), date(2024, 1, 5), BookCondition::Good);
        assert_eq!(a.days_late, 0);
        assert_eq!(a.total, 0);
    }

    #[test]
    fn test_damaged_surcharge_on_time() {
        let policy = FinePolicy::default();
        let a = policy.assess(date(2024, 1, 1), date(2024, 1, 5), BookCondition::Damaged);
        assert_eq!(a.total, 100_000);
        assert_eq!(a.reason, Some(FineReason::Damaged));
    }

    #[test]
    fn test_surcharges_are_additive_with_late_fees() {
        let policy = FinePolicy::default();
        let returned = date(2024, 2, 15); // 45 days late, 75_000 late fee
        let damaged = policy.assess(date(2024, 1, 1), returned, BookCondition::Damaged);
        assert_eq!(damaged.total, 75_000 + 100_000);
        assert_eq!(damaged.reason, Some(FineReason::Damaged));
        let lost = policy.assess(date(2024, 1, 1), returned, BookCondition::Lost);
        assert_eq!(lost.total, 75_000 + 200_000);
        assert_eq!(lost.reason, Some(FineReason::Lost));
    }
}
