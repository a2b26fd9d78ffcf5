//! Reservation model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::enums::ReservationStatus;

/// Internal row structure for database queries (with String status)
#[derive(Debug, Clone, FromRow)]
pub struct ReservationRow {
    id: i32,
    reader_id: i32,
    book_id: i32,
    reserved_at: DateTime<Utc>,
    pickup_deadline: Option<DateTime<Utc>>,
    status: String,
}

impl From<ReservationRow> for Reservation {
    fn from(row: ReservationRow) -> Self {
        Reservation {
            id: row.id,
            reader_id: row.reader_id,
            book_id: row.book_id,
            reserved_at: row.reserved_at,
            pickup_deadline: row.pickup_deadline,
            status: row.status.parse().unwrap_or(ReservationStatus::Pending),
        }
    }
}

/// Reservation record
///
/// `pickup_deadline` is set when the reservation is promoted to notified.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Reservation {
    pub id: i32,
    pub reader_id: i32,
    pub book_id: i32,
    pub reserved_at: DateTime<Utc>,
    pub pickup_deadline: Option<DateTime<Utc>>,
    pub status: ReservationStatus,
}

/// Reservation with reader/book context for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationDetails {
    pub id: i32,
    pub reader_id: i32,
    pub reader_name: String,
    pub book_id: i32,
    pub book_title: String,
    pub reserved_at: DateTime<Utc>,
    pub pickup_deadline: Option<DateTime<Utc>>,
    pub status: ReservationStatus,
    /// Display-time predicate: notified and past the pickup deadline
    pub is_expired: bool,
}

/// Create reservation request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReservation {
    pub reader_id: i32,
    pub book_id: i32,
}

/// Reservation query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ReservationQuery {
    pub status: Option<ReservationStatus>,
    pub reader_id: Option<i32>,
    pub book_id: Option<i32>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Reservation eligibility check parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ReservationCheckQuery {
    pub reader_id: i32,
    pub book_id: i32,
}

/// Reservation eligibility check result
#[derive(Debug, Serialize, ToSchema)]
pub struct ReservationCheck {
    pub allowed: bool,
    /// Reasons the reservation would be rejected, empty when allowed
    pub reasons: Vec<String>,
}
