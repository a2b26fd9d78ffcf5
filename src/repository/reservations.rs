//! Reservations repository for database operations
//!
//! Status changes go through the transition guards in
//! [`crate::circulation::reservation`] and are applied with conditional
//! UPDATEs, so an out-of-order operation is rejected at the data layer no
//! matter what the caller's UI showed.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    circulation::reservation::{apply, is_expired, ReservationAction},
    error::{AppError, AppResult, ErrorCode},
    models::{
        borrow::{Borrow, BorrowRow},
        enums::ReservationStatus,
        reservation::{
            CreateReservation, Reservation, ReservationDetails, ReservationQuery, ReservationRow,
        },
    },
};

#[derive(Clone)]
pub struct ReservationsRepository {
    pool: Pool<Postgres>,
}

impl ReservationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get reservation by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Reservation> {
        let row = sqlx::query_as::<_, ReservationRow>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))?;

        Ok(row.into())
    }

    /// List reservations with optional filters and pagination
    pub async fn list(&self, query: &ReservationQuery) -> AppResult<(Vec<ReservationDetails>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(25).clamp(1, 100);
        let status = query.status.map(|s| s.as_str());

        let rows = sqlx::query(
            r#"
            SELECT v.*, r.full_name AS reader_name, k.title AS book_title
            FROM reservations v
            JOIN readers r ON v.reader_id = r.id
            JOIN books k ON v.book_id = k.id
            WHERE ($1::text IS NULL OR v.status = $1)
              AND ($2::int IS NULL OR v.reader_id = $2)
              AND ($3::int IS NULL OR v.book_id = $3)
            ORDER BY v.reserved_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(status)
        .bind(query.reader_id)
        .bind(query.book_id)
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM reservations v
            WHERE ($1::text IS NULL OR v.status = $1)
              AND ($2::int IS NULL OR v.reader_id = $2)
              AND ($3::int IS NULL OR v.book_id = $3)
            "#,
        )
        .bind(status)
        .bind(query.reader_id)
        .bind(query.book_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(details_from_row).collect(), total))
    }

    /// The live queue for a title, oldest claim first
    pub async fn queue_for_book(&self, book_id: i32) -> AppResult<Vec<ReservationDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT v.*, r.full_name AS reader_name, k.title AS book_title
            FROM reservations v
            JOIN readers r ON v.reader_id = r.id
            JOIN books k ON v.book_id = k.id
            WHERE v.book_id = $1 AND v.status IN ('pending', 'notified')
            ORDER BY v.reserved_at
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(details_from_row).collect())
    }

    /// Whether the reader already holds a live reservation on the title
    pub async fn exists_live(&self, reader_id: i32, book_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM reservations
                WHERE reader_id = $1 AND book_id = $2 AND status IN ('pending', 'notified')
            )
            "#,
        )
        .bind(reader_id)
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Queue a new claim; eligibility is checked by the service beforehand
    pub async fn create(&self, reservation: &CreateReservation) -> AppResult<Reservation> {
        let row = sqlx::query_as::<_, ReservationRow>(
            r#"
            INSERT INTO reservations (reader_id, book_id, reserved_at, status)
            VALUES ($1, $2, NOW(), 'pending')
            RETURNING *
            "#,
        )
        .bind(reservation.reader_id)
        .bind(reservation.book_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Notify a specific pending reservation, holding one available copy
    pub async fn notify(&self, id: i32, deadline: DateTime<Utc>) -> AppResult<Reservation> {
        let mut tx = self.pool.begin().await?;

        let current = self.lock_status(&mut tx, id).await?;
        apply(current.status, ReservationAction::Notify)?;

        let held = sqlx::query(
            "UPDATE books SET available_copies = available_copies - 1 WHERE id = $1 AND available_copies > 0",
        )
        .bind(current.book_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if held == 0 {
            return Err(AppError::BusinessRule(
                ErrorCode::BookNotAvailable,
                "No copy available to hold for this reservation".to_string(),
            ));
        }

        let row = sqlx::query_as::<_, ReservationRow>(
            r#"
            UPDATE reservations SET status = 'notified', pickup_deadline = $2
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(deadline)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// Promote the oldest pending reservation for a title, if a copy can be
    /// held. Returns None when the queue is empty or no copy is free.
    pub async fn promote_oldest_pending(
        &self,
        book_id: i32,
        deadline: DateTime<Utc>,
    ) -> AppResult<Option<Reservation>> {
        let mut tx = self.pool.begin().await?;

        let oldest: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT id FROM reservations
            WHERE book_id = $1 AND status = 'pending'
            ORDER BY reserved_at
            LIMIT 1
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?;

        let id = match oldest {
            Some(id) => id,
            None => return Ok(None),
        };

        let held = sqlx::query(
            "UPDATE books SET available_copies = available_copies - 1 WHERE id = $1 AND available_copies > 0",
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if held == 0 {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, ReservationRow>(
            r#"
            UPDATE reservations SET status = 'notified', pickup_deadline = $2
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(deadline)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(row.into()))
    }

    /// Confirm pickup: the held copy becomes a loan in the same transaction
    pub async fn confirm_received(
        &self,
        id: i32,
        loan_period_days: i32,
    ) -> AppResult<(Reservation, Borrow)> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let current = self.lock_status(&mut tx, id).await?;
        apply(current.status, ReservationAction::ConfirmReceived)?;

        let row = sqlx::query_as::<_, ReservationRow>(
            r#"
            UPDATE reservations SET status = 'received'
            WHERE id = $1 AND status = 'notified'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        // The copy was held at notification time, so no availability change
        let borrow_row = sqlx::query_as::<_, BorrowRow>(
            r#"
            INSERT INTO borrows (reader_id, book_id, borrowed_at, due_date, status,
                                 renewal_count, fine_amount)
            VALUES ($1, $2, $3, $4, 'borrowing', 0, 0)
            RETURNING *
            "#,
        )
        .bind(current.reader_id)
        .bind(current.book_id)
        .bind(now)
        .bind(now + chrono::Duration::days(loan_period_days as i64))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((row.into(), borrow_row.into()))
    }

    /// Cancel a live reservation; releases the held copy when the reader had
    /// already been notified. Returns the updated record and whether a copy
    /// went back on the shelf.
    pub async fn cancel(&self, id: i32) -> AppResult<(Reservation, bool)> {
        let mut tx = self.pool.begin().await?;

        let current = self.lock_status(&mut tx, id).await?;
        apply(current.status, ReservationAction::Cancel)?;
        let releases_copy = current.status == ReservationStatus::Notified;

        let row = sqlx::query_as::<_, ReservationRow>(
            r#"
            UPDATE reservations SET status = 'cancelled'
            WHERE id = $1 AND status IN ('pending', 'notified')
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if releases_copy {
            sqlx::query("UPDATE books SET available_copies = available_copies + 1 WHERE id = $1")
                .bind(current.book_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok((row.into(), releases_copy))
    }

    /// IDs of notified reservations whose pickup deadline has passed
    pub async fn expired_notified(&self, now: DateTime<Utc>) -> AppResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, ReservationRow>(
            "SELECT * FROM reservations WHERE status = 'notified' AND pickup_deadline < $1",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Reservation::from).collect())
    }

    /// Count reservations in a given status
    pub async fn count_by_status(&self, status: ReservationStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Fetch and row-lock a reservation inside a transaction
    async fn lock_status(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        id: i32,
    ) -> AppResult<Reservation> {
        let row = sqlx::query_as::<_, ReservationRow>(
            "SELECT * FROM reservations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))?;

        Ok(row.into())
    }
}

fn details_from_row(row: sqlx::postgres::PgRow) -> ReservationDetails {
    let status: ReservationStatus = row
        .get::<String, _>("status")
        .parse()
        .unwrap_or(ReservationStatus::Pending);
    let pickup_deadline: Option<DateTime<Utc>> = row.get("pickup_deadline");

    ReservationDetails {
        id: row.get("id"),
        reader_id: row.get("reader_id"),
        reader_name: row.get("reader_name"),
        book_id: row.get("book_id"),
        book_title: row.get("book_title"),
        reserved_at: row.get("reserved_at"),
        pickup_deadline,
        status,
        is_expired: is_expired(status, pickup_deadline, Utc::now()),
    }
}
