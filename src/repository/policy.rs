//! Circulation policy repository

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::policy::{CirculationPolicy, UpdatePolicy},
};

#[derive(Clone)]
pub struct PolicyRepository {
    pool: Pool<Postgres>,
}

impl PolicyRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get the current policy; the settings row is seeded by migration
    pub async fn get(&self) -> AppResult<CirculationPolicy> {
        let policy = sqlx::query_as::<_, CirculationPolicy>(
            r#"
            SELECT loan_period_days, max_active_borrows, grace_days, late_fee_per_day,
                   damaged_surcharge, lost_surcharge, max_renewal_days, max_renewals,
                   pickup_window_days
            FROM circulation_policy
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?
        .unwrap_or_default();

        Ok(policy)
    }

    /// Apply a partial update and return the resulting policy
    pub async fn update(&self, update: &UpdatePolicy) -> AppResult<CirculationPolicy> {
        sqlx::query(
            r#"
            UPDATE circulation_policy SET
                loan_period_days = COALESCE($1, loan_period_days),
                max_active_borrows = COALESCE($2, max_active_borrows),
                grace_days = COALESCE($3, grace_days),
                late_fee_per_day = COALESCE($4, late_fee_per_day),
                damaged_surcharge = COALESCE($5, damaged_surcharge),
                lost_surcharge = COALESCE($6, lost_surcharge),
                max_renewal_days = COALESCE($7, max_renewal_days),
                max_renewals = COALESCE($8, max_renewals),
                pickup_window_days = COALESCE($9, pickup_window_days)
            WHERE id = 1
            "#,
        )
        .bind(update.loan_period_days)
        .bind(update.max_active_borrows)
        .bind(update.grace_days)
        .bind(update.late_fee_per_day)
        .bind(update.damaged_surcharge)
        .bind(update.lost_surcharge)
        .bind(update.max_renewal_days)
        .bind(update.max_renewals)
        .bind(update.pickup_window_days)
        .execute(&self.pool)
        .await?;

        self.get().await
    }
}
