//! Renewal planning
//!
//! A renewal moves the due date forward by a bounded number of days and is
//! capped in how many times it can happen per borrow. Both limits are hard
//! server-side checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::WorkflowError;

/// Renewal limits, loaded from the circulation policy settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RenewalPolicy {
    /// Maximum days a single renewal may add
    pub max_renewal_days: i64,
    /// Maximum renewals per borrow
    pub max_renewals: i16,
}

impl Default for RenewalPolicy {
    fn default() -> Self {
        Self {
            max_renewal_days: 30,
            max_renewals: 2,
        }
    }
}

/// Validated renewal, ready to persist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RenewalPlan {
    pub renewal_days: i64,
    pub new_due_date: DateTime<Utc>,
    /// Renewal count on the borrow after this renewal
    pub renewal_count: i16,
}

/// Whole days between the old and requested due date, clamped to zero
pub fn renewal_days(old_due_date: DateTime<Utc>, new_due_date: DateTime<Utc>) -> i64 {
    (new_due_date - old_due_date).num_days().max(0)
}

impl RenewalPolicy {
    /// Validate a requested renewal against this policy
    pub fn plan(
        &self,
        old_due_date: DateTime<Utc>,
        new_due_date: DateTime<Utc>,
        current_count: i16,
    ) -> Result<RenewalPlan, WorkflowError> {
        if current_count >= self.max_renewals {
            return Err(WorkflowError::MaxRenewalsReached {
                count: current_count,
                max: self.max_renewals,
            });
        }

        let days = renewal_days(old_due_date, new_due_date);
        if days == 0 {
            return Err(WorkflowError::RenewalNotForward);
        }
        if days > self.max_renewal_days {
            return Err(WorkflowError::RenewalTooLong {
                days,
                max: self.max_renewal_days,
            });
        }

        Ok(RenewalPlan {
            renewal_days: days,
            new_due_date,
            renewal_count: current_count + 1,
        })
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
    fn test_renewal_days_never_negative() {
        assert_eq!(renewal_days(date(2024, 1, 10), date(2024, 1, 5)), 0);
        assert_eq!(renewal_days(date(2024, 1, 10), date(2024, 1, 10)), 0);
        assert_eq!(renewal_days(date(2024, 1, 1), date(2024, 1, 20)), 19);
    }

    #[test]
    fn test_renewal_within_limit() {
        let plan = RenewalPolicy::default()
            .plan(date(2024, 1, 1), date(2024, 1, 20), 0)
            .unwrap();
        assert_eq!(plan.renewal_days, 19);
        assert_eq!(plan.renewal_count, 1);
        assert_eq!(plan.new_due_date, date(2024, 1, 20));
    }

    #[test]
    fn test_renewal_exceeding_limit_rejected() {
        let err = RenewalPolicy::default()
            .plan(date(2024, 1, 1), date(2024, 3, 1), 0)
            .unwrap_err();
        assert_eq!(err, WorkflowError::RenewalTooLong { days: 60, max: 30 });
    }

    #[test]
    fn test_backwards_renewal_rejected() {
        let err = RenewalPolicy::default()
            .plan(date(2024, 1, 10), date(2024, 1, 5), 0)
            .unwrap_err();
        assert_eq!(err, WorkflowError::RenewalNotForward);
    }

    #[test]
    fn test_renewal_count_cap_is_hard() {
        let policy = RenewalPolicy::default();
        assert!(policy.plan(date(2024, 1, 1), date(2024, 1, 20), 1).is_ok());
        let err = policy
            .plan(date(2024, 1, 1), date(2024, 1, 20), 2)
            .unwrap_err();
        assert_eq!(err, WorkflowError::MaxRenewalsReached { count: 2, max: 2 });
    }
}
