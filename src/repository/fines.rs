//! Fines repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::{
        enums::{FineStatus, PaymentMethod},
        fine::{CreateFine, Fine, FineRow},
    },
};

#[derive(Clone)]
pub struct FinesRepository {
    pool: Pool<Postgres>,
}

impl FinesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get fine by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Fine> {
        let row = sqlx::query_as::<_, FineRow>("SELECT * FROM fines WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Fine with id {} not found", id)))?;

        Ok(row.into())
    }

    /// Get fines for a reader, newest first
    pub async fn get_reader_fines(&self, reader_id: i32) -> AppResult<Vec<Fine>> {
        let rows = sqlx::query_as::<_, FineRow>(
            "SELECT * FROM fines WHERE reader_id = $1 ORDER BY created_at DESC",
        )
        .bind(reader_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Fine::from).collect())
    }

    /// Create a fine by hand, outside the return flow
    pub async fn create(&self, fine: &CreateFine) -> AppResult<Fine> {
        let row = sqlx::query_as::<_, FineRow>(
            r#"
            INSERT INTO fines (reader_id, book_id, amount, reason, status, created_at)
            VALUES ($1, $2, $3, $4, 'unpaid', NOW())
            RETURNING *
            "#,
        )
        .bind(fine.reader_id)
        .bind(fine.book_id)
        .bind(fine.amount)
        .bind(fine.reason.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Settle a fine
    ///
    /// The update is conditional on the unpaid status so the transition can
    /// only ever happen once; a repeat attempt is a conflict, not a rewrite.
    pub async fn pay(
        &self,
        id: i32,
        method: PaymentMethod,
        transaction_code: Option<&str>,
    ) -> AppResult<Fine> {
        let row = sqlx::query_as::<_, FineRow>(
            r#"
            UPDATE fines
            SET status = 'paid', payment_method = $2, transaction_code = $3,
                receipt_no = $4, paid_at = $5
            WHERE id = $1 AND status = 'unpaid'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(method.as_str())
        .bind(transaction_code)
        .bind(Uuid::new_v4())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row.into()),
            None => {
                let existing = self.get_by_id(id).await?;
                debug_assert_eq!(existing.status, FineStatus::Paid);
                Err(AppError::Conflict(
                    ErrorCode::FineAlreadyPaid,
                    format!("Fine {} is already paid", id),
                ))
            }
        }
    }

    /// Count unpaid fines
    pub async fn count_unpaid(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM fines WHERE status = 'unpaid'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Total outstanding amount across all unpaid fines, VND
    pub async fn unpaid_total(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0) FROM fines WHERE status = 'unpaid'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}
