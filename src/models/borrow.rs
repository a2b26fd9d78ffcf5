//! Borrow (loan) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::BorrowStatus;

/// Internal row structure for database queries (with String status)
#[derive(Debug, Clone, FromRow)]
pub struct BorrowRow {
    id: i32,
    reader_id: i32,
    book_id: i32,
    borrowed_at: DateTime<Utc>,
    due_date: DateTime<Utc>,
    returned_date: Option<DateTime<Utc>>,
    status: String,
    renewal_count: i16,
    fine_amount: i64,
}

impl From<BorrowRow> for Borrow {
    fn from(row: BorrowRow) -> Self {
        Borrow {
            id: row.id,
            reader_id: row.reader_id,
            book_id: row.book_id,
            borrowed_at: row.borrowed_at,
            due_date: row.due_date,
            returned_date: row.returned_date,
            status: row.status.parse().unwrap_or(BorrowStatus::Borrowing),
            renewal_count: row.renewal_count,
            fine_amount: row.fine_amount,
        }
    }
}

/// Borrow record
///
/// Created when a loan is issued, mutated by renewals and the return flow,
/// then archived into `borrow_archives` and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Borrow {
    pub id: i32,
    pub reader_id: i32,
    pub book_id: i32,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_date: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
    pub renewal_count: i16,
    /// Fine assessed at return time, in VND
    pub fine_amount: i64,
}

/// Borrow with reader/book context for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowDetails {
    pub id: i32,
    pub reader_id: i32,
    pub reader_name: String,
    pub book_id: i32,
    pub book_title: String,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_date: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
    pub renewal_count: i16,
    pub fine_amount: i64,
    pub is_overdue: bool,
}

/// Create borrow request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBorrow {
    pub reader_id: i32,
    pub book_id: i32,
}

/// Renewal record emitted on every successful renewal
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RenewalRecord {
    pub id: i32,
    pub borrow_id: i32,
    pub old_due_date: DateTime<Utc>,
    pub new_due_date: DateTime<Utc>,
    pub renewal_days: i32,
    /// Renewal count on the borrow after this renewal
    pub renewal_count: i16,
    pub created_at: DateTime<Utc>,
}
