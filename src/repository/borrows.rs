//! Borrows repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    circulation::{RenewalPlan, ReturnSlip},
    error::{AppError, AppResult, ErrorCode},
    models::{
        borrow::{Borrow, BorrowDetails, BorrowRow, CreateBorrow, RenewalRecord},
        enums::{BookCondition, BorrowStatus, FineStatus},
        fine::{Fine, FineRow},
    },
};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get borrow by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Borrow> {
        let row = sqlx::query_as::<_, BorrowRow>("SELECT * FROM borrows WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow with id {} not found", id)))?;

        Ok(row.into())
    }

    /// Get active borrows for a reader
    pub async fn get_reader_borrows(&self, reader_id: i32) -> AppResult<Vec<BorrowDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT b.*, r.full_name AS reader_name, k.title AS book_title
            FROM borrows b
            JOIN readers r ON b.reader_id = r.id
            JOIN books k ON b.book_id = k.id
            WHERE b.reader_id = $1 AND b.returned_date IS NULL
            ORDER BY b.due_date
            "#,
        )
        .bind(reader_id)
        .fetch_all(&self.pool)
        .await?;

        let now = Utc::now();

        let mut result = Vec::new();
        for row in rows {
            let due_date: chrono::DateTime<Utc> = row.get("due_date");
            result.push(BorrowDetails {
                id: row.get("id"),
                reader_id: row.get("reader_id"),
                reader_name: row.get("reader_name"),
                book_id: row.get("book_id"),
                book_title: row.get("book_title"),
                borrowed_at: row.get("borrowed_at"),
                due_date,
                returned_date: row.get("returned_date"),
                status: BorrowStatus::Borrowing,
                renewal_count: row.get("renewal_count"),
                fine_amount: row.get("fine_amount"),
                is_overdue: due_date < now,
            });
        }

        Ok(result)
    }

    /// Issue a loan
    ///
    /// Checks the reader is active, the title is not already out to them,
    /// their borrow limit is not reached, and a copy is available. The copy
    /// decrement is conditional so concurrent issues cannot oversubscribe.
    pub async fn create(
        &self,
        borrow: &CreateBorrow,
        loan_period_days: i32,
        max_active_borrows: i32,
    ) -> AppResult<Borrow> {
        let now = Utc::now();
        let due_date = now + chrono::Duration::days(loan_period_days as i64);

        let mut tx = self.pool.begin().await?;

        let reader_status: Option<String> =
            sqlx::query_scalar("SELECT status FROM readers WHERE id = $1")
                .bind(borrow.reader_id)
                .fetch_optional(&mut *tx)
                .await?;

        match reader_status.as_deref() {
            None => {
                return Err(AppError::NotFound(format!(
                    "Reader with id {} not found",
                    borrow.reader_id
                )))
            }
            Some("active") => {}
            Some(_) => {
                return Err(AppError::BusinessRule(
                    ErrorCode::ReaderBlocked,
                    "Reader account is blocked".to_string(),
                ))
            }
        }

        let already_borrowing: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrows WHERE reader_id = $1 AND book_id = $2 AND returned_date IS NULL)",
        )
        .bind(borrow.reader_id)
        .bind(borrow.book_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_borrowing {
            return Err(AppError::BusinessRule(
                ErrorCode::Duplicate,
                "Reader already has this title out on loan".to_string(),
            ));
        }

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrows WHERE reader_id = $1 AND returned_date IS NULL",
        )
        .bind(borrow.reader_id)
        .fetch_one(&mut *tx)
        .await?;

        if active >= max_active_borrows as i64 {
            return Err(AppError::BusinessRule(
                ErrorCode::MaxBorrowsReached,
                format!("Maximum borrows reached ({}/{})", active, max_active_borrows),
            ));
        }

        let decremented = sqlx::query(
            "UPDATE books SET available_copies = available_copies - 1 WHERE id = $1 AND available_copies > 0",
        )
        .bind(borrow.book_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if decremented == 0 {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                .bind(borrow.book_id)
                .fetch_one(&mut *tx)
                .await?;
            return Err(if exists {
                AppError::BusinessRule(
                    ErrorCode::BookNotAvailable,
                    "No copies available; the title can be reserved instead".to_string(),
                )
            } else {
                AppError::NotFound(format!("Book with id {} not found", borrow.book_id))
            });
        }

        let row = sqlx::query_as::<_, BorrowRow>(
            r#"
            INSERT INTO borrows (reader_id, book_id, borrowed_at, due_date, status,
                                 renewal_count, fine_amount)
            VALUES ($1, $2, $3, $4, 'borrowing', 0, 0)
            RETURNING *
            "#,
        )
        .bind(borrow.reader_id)
        .bind(borrow.book_id)
        .bind(now)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// Complete a return from a finished return slip
    ///
    /// Archives the borrow, restores the copy (unless lost), and records the
    /// assessed fine, all in one transaction. Returns the created fine (if
    /// any) and whether a copy came back onto the shelf.
    pub async fn complete_return(&self, slip: &ReturnSlip) -> AppResult<(Option<Fine>, bool)> {
        let mut tx = self.pool.begin().await?;

        let renewal_count: Option<i16> = sqlx::query_scalar(
            "DELETE FROM borrows WHERE id = $1 AND returned_date IS NULL RETURNING renewal_count",
        )
        .bind(slip.borrow_id)
        .fetch_optional(&mut *tx)
        .await?;

        let renewal_count = match renewal_count {
            Some(count) => count,
            None => {
                let existed: bool = sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM borrow_archives WHERE borrow_id = $1)",
                )
                .bind(slip.borrow_id)
                .fetch_one(&mut *tx)
                .await?;
                return Err(if existed {
                    AppError::Conflict(
                        ErrorCode::AlreadyReturned,
                        "Borrow already returned".to_string(),
                    )
                } else {
                    AppError::NotFound(format!("Borrow with id {} not found", slip.borrow_id))
                });
            }
        };

        sqlx::query(
            r#"
            INSERT INTO borrow_archives (borrow_id, reader_id, book_id, borrowed_at, due_date,
                                         returned_date, condition, renewal_count, fine_amount,
                                         notes, archived_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(slip.borrow_id)
        .bind(slip.reader_id)
        .bind(slip.book_id)
        .bind(slip.borrowed_at)
        .bind(slip.due_date)
        .bind(slip.returned_date)
        .bind(slip.condition.as_str())
        .bind(renewal_count)
        .bind(slip.assessment.total)
        .bind(&slip.notes)
        .bind(slip.completed_at)
        .execute(&mut *tx)
        .await?;

        let copy_freed = match slip.condition {
            BookCondition::Lost => {
                // The copy is gone for good
                sqlx::query(
                    "UPDATE books SET total_copies = total_copies - 1, updated_at = NOW() WHERE id = $1",
                )
                .bind(slip.book_id)
                .execute(&mut *tx)
                .await?;
                false
            }
            _ => {
                sqlx::query(
                    "UPDATE books SET available_copies = available_copies + 1, updated_at = NOW() WHERE id = $1",
                )
                .bind(slip.book_id)
                .execute(&mut *tx)
                .await?;
                true
            }
        };

        let fine = if slip.assessment.total > 0 {
            let reason = slip
                .assessment
                .reason
                .unwrap_or(crate::models::enums::FineReason::LateReturn);
            let (status, method, code, receipt, paid_at) = match &slip.payment {
                Some(payment) => (
                    FineStatus::Paid,
                    Some(payment.method.as_str()),
                    payment.transaction_code.clone(),
                    Some(Uuid::new_v4()),
                    Some(slip.completed_at),
                ),
                None => (FineStatus::Unpaid, None, None, None, None),
            };

            let row = sqlx::query_as::<_, FineRow>(
                r#"
                INSERT INTO fines (reader_id, book_id, borrow_id, amount, reason,
                                   payment_method, transaction_code, status, receipt_no,
                                   created_at, paid_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                RETURNING *
                "#,
            )
            .bind(slip.reader_id)
            .bind(slip.book_id)
            .bind(slip.borrow_id)
            .bind(slip.assessment.total)
            .bind(reason.as_str())
            .bind(method)
            .bind(code)
            .bind(status.as_str())
            .bind(receipt)
            .bind(slip.completed_at)
            .bind(paid_at)
            .fetch_one(&mut *tx)
            .await?;

            Some(Fine::from(row))
        } else {
            None
        };

        tx.commit().await?;

        Ok((fine, copy_freed))
    }

    /// Apply a validated renewal plan
    ///
    /// The borrow update is conditional on the renewal count the plan was
    /// computed from, so a concurrent renewal cannot double-apply.
    pub async fn renew(&self, borrow_id: i32, plan: &RenewalPlan) -> AppResult<RenewalRecord> {
        let mut tx = self.pool.begin().await?;

        let old_due_date: Option<chrono::DateTime<Utc>> =
            sqlx::query_scalar("SELECT due_date FROM borrows WHERE id = $1")
                .bind(borrow_id)
                .fetch_optional(&mut *tx)
                .await?;

        let old_due_date = old_due_date
            .ok_or_else(|| AppError::NotFound(format!("Borrow with id {} not found", borrow_id)))?;

        let updated = sqlx::query(
            r#"
            UPDATE borrows SET due_date = $2, renewal_count = $3
            WHERE id = $1 AND renewal_count = $4 AND returned_date IS NULL
            "#,
        )
        .bind(borrow_id)
        .bind(plan.new_due_date)
        .bind(plan.renewal_count)
        .bind(plan.renewal_count - 1)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AppError::Conflict(
                ErrorCode::AlreadyReturned,
                "Borrow was returned or renewed concurrently".to_string(),
            ));
        }

        let record = sqlx::query_as::<_, RenewalRecord>(
            r#"
            INSERT INTO renewals (borrow_id, old_due_date, new_due_date, renewal_days,
                                  renewal_count, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING *
            "#,
        )
        .bind(borrow_id)
        .bind(old_due_date)
        .bind(plan.new_due_date)
        .bind(plan.renewal_days as i32)
        .bind(plan.renewal_count)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(record)
    }

    /// Count active borrows
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM borrows WHERE returned_date IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count overdue borrows
    pub async fn count_overdue(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrows WHERE returned_date IS NULL AND due_date < NOW()",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
