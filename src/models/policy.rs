//! Circulation policy settings

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::circulation::{FinePolicy, RenewalPolicy};

/// Library-wide circulation policy, stored as a single settings row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CirculationPolicy {
    /// Loan duration in days
    pub loan_period_days: i32,
    /// Maximum simultaneous borrows per reader
    pub max_active_borrows: i32,
    /// Days past due before the late fee starts accruing
    pub grace_days: i32,
    /// Late fee per chargeable day, VND
    pub late_fee_per_day: i64,
    /// Flat surcharge for a damaged book, VND
    pub damaged_surcharge: i64,
    /// Flat surcharge for a lost book, VND
    pub lost_surcharge: i64,
    /// Maximum days a single renewal may add
    pub max_renewal_days: i32,
    /// Maximum renewals per borrow
    pub max_renewals: i16,
    /// Days a notified reader has to pick up a reserved book
    pub pickup_window_days: i32,
}

impl CirculationPolicy {
    pub fn fine_policy(&self) -> FinePolicy {
        FinePolicy {
            grace_days: self.grace_days as i64,
            late_fee_per_day: self.late_fee_per_day,
            damaged_surcharge: self.damaged_surcharge,
            lost_surcharge: self.lost_surcharge,
        }
    }

    pub fn renewal_policy(&self) -> RenewalPolicy {
        RenewalPolicy {
            max_renewal_days: self.max_renewal_days as i64,
            max_renewals: self.max_renewals,
        }
    }
}

impl Default for CirculationPolicy {
    fn default() -> Self {
        Self {
            loan_period_days: 14,
            max_active_borrows: 5,
            grace_days: 30,
            late_fee_per_day: 5_000,
            damaged_surcharge: 100_000,
            lost_surcharge: 200_000,
            max_renewal_days: 30,
            max_renewals: 2,
            pickup_window_days: 3,
        }
    }
}

/// Update policy request; absent fields keep their current value
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePolicy {
    #[validate(range(min = 1, message = "Loan period must be at least one day"))]
    pub loan_period_days: Option<i32>,
    #[validate(range(min = 1, message = "Borrow limit must be at least one"))]
    pub max_active_borrows: Option<i32>,
    #[validate(range(min = 0, message = "Grace window cannot be negative"))]
    pub grace_days: Option<i32>,
    #[validate(range(min = 0, message = "Late fee cannot be negative"))]
    pub late_fee_per_day: Option<i64>,
    #[validate(range(min = 0, message = "Surcharge cannot be negative"))]
    pub damaged_surcharge: Option<i64>,
    #[validate(range(min = 0, message = "Surcharge cannot be negative"))]
    pub lost_surcharge: Option<i64>,
    #[validate(range(min = 1, message = "Renewal window must be at least one day"))]
    pub max_renewal_days: Option<i32>,
    #[validate(range(min = 0, message = "Renewal cap cannot be negative"))]
    pub max_renewals: Option<i16>,
    #[validate(range(min = 1, message = "Pickup window must be at least one day"))]
    pub pickup_window_days: Option<i32>,
}
