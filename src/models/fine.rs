//! Fine and payment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::enums::{BookCondition, FineReason, FineStatus, PaymentMethod};

/// Internal row structure for database queries (with String enums)
#[derive(Debug, Clone, FromRow)]
pub struct FineRow {
    id: i32,
    reader_id: i32,
    book_id: i32,
    borrow_id: Option<i32>,
    amount: i64,
    reason: String,
    payment_method: Option<String>,
    transaction_code: Option<String>,
    status: String,
    receipt_no: Option<Uuid>,
    created_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

impl From<FineRow> for Fine {
    fn from(row: FineRow) -> Self {
        Fine {
            id: row.id,
            reader_id: row.reader_id,
            book_id: row.book_id,
            borrow_id: row.borrow_id,
            amount: row.amount,
            reason: row.reason.parse().unwrap_or(FineReason::LateReturn),
            payment_method: row.payment_method.and_then(|m| m.parse().ok()),
            transaction_code: row.transaction_code,
            status: row.status.parse().unwrap_or(FineStatus::Unpaid),
            receipt_no: row.receipt_no,
            created_at: row.created_at,
            paid_at: row.paid_at,
        }
    }
}

/// Fine record
///
/// Status transitions unpaid -> paid exactly once; payment details are only
/// present on paid fines.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Fine {
    pub id: i32,
    pub reader_id: i32,
    pub book_id: i32,
    /// Originating borrow, absent for fines entered by hand
    pub borrow_id: Option<i32>,
    /// Amount in VND
    pub amount: i64,
    pub reason: FineReason,
    pub payment_method: Option<PaymentMethod>,
    pub transaction_code: Option<String>,
    pub status: FineStatus,
    /// Receipt identifier minted when the fine is paid
    pub receipt_no: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Create fine request (manual entry, outside the return flow)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFine {
    pub reader_id: i32,
    pub book_id: i32,
    #[validate(range(min = 1, message = "Fine amount must be positive"))]
    pub amount: i64,
    pub reason: FineReason,
}

/// Pay fine request
#[derive(Debug, Deserialize, ToSchema)]
pub struct PayFine {
    pub payment_method: PaymentMethod,
    /// Free-text bank transaction reference, only meaningful for transfers
    pub transaction_code: Option<String>,
}

/// Fine assessment preview request
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssessFineRequest {
    pub due_date: DateTime<Utc>,
    /// Defaults to now
    pub returned_date: Option<DateTime<Utc>>,
    /// Defaults to good
    pub condition: Option<BookCondition>,
}
