//! Shared domain enums for the circulation workflow
//!
//! All statuses cross the REST boundary and the database as lowercase string
//! slugs; the enums here are the single source of truth for the accepted
//! values. Database rows store plain text and are parsed in the repository
//! layer row conversions.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// BookCondition
// ---------------------------------------------------------------------------

/// Condition of a book as captured at return time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookCondition {
    Good,
    Damaged,
    Lost,
}

impl Default for BookCondition {
    fn default() -> Self {
        BookCondition::Good
    }
}

impl BookCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookCondition::Good => "good",
            BookCondition::Damaged => "damaged",
            BookCondition::Lost => "lost",
        }
    }
}

impl std::fmt::Display for BookCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "good" => Ok(BookCondition::Good),
            "damaged" => Ok(BookCondition::Damaged),
            "lost" => Ok(BookCondition::Lost),
            _ => Err(format!("Invalid book condition: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// BorrowStatus
// ---------------------------------------------------------------------------

/// Lifecycle of a borrow record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BorrowStatus {
    Borrowing,
    Returned,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowStatus::Borrowing => "borrowing",
            BorrowStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BorrowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "borrowing" => Ok(BorrowStatus::Borrowing),
            "returned" => Ok(BorrowStatus::Returned),
            _ => Err(format!("Invalid borrow status: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// FineReason
// ---------------------------------------------------------------------------

/// Why a fine was assessed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FineReason {
    LateReturn,
    Damaged,
    Lost,
}

impl FineReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FineReason::LateReturn => "late_return",
            FineReason::Damaged => "damaged",
            FineReason::Lost => "lost",
        }
    }
}

impl std::fmt::Display for FineReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FineReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "late_return" | "late" => Ok(FineReason::LateReturn),
            "damaged" => Ok(FineReason::Damaged),
            "lost" => Ok(FineReason::Lost),
            _ => Err(format!("Invalid fine reason: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// FineStatus
// ---------------------------------------------------------------------------

/// Payment state of a fine, transitions unpaid -> paid exactly once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FineStatus {
    Unpaid,
    Paid,
}

impl FineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FineStatus::Unpaid => "unpaid",
            FineStatus::Paid => "paid",
        }
    }
}

impl std::fmt::Display for FineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FineStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unpaid" => Ok(FineStatus::Unpaid),
            "paid" => Ok(FineStatus::Paid),
            _ => Err(format!("Invalid fine status: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// PaymentMethod
// ---------------------------------------------------------------------------

/// Accepted payment methods for fines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankTransfer => "bank_transfer",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "bank_transfer" | "bank" => Ok(PaymentMethod::BankTransfer),
            _ => Err(format!("Invalid payment method: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// ReservationStatus
// ---------------------------------------------------------------------------

/// Reservation queue states
///
/// `pending -> notified -> received` is the happy path; `cancelled` is
/// reachable from any non-terminal state. `received` and `cancelled` are
/// terminal. Transition guards live in [`crate::circulation::reservation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Notified,
    Received,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Notified => "notified",
            ReservationStatus::Received => "received",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    /// Whether no further transition is allowed out of this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReservationStatus::Received | ReservationStatus::Cancelled)
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ReservationStatus::Pending),
            "notified" => Ok(ReservationStatus::Notified),
            "received" => Ok(ReservationStatus::Received),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            _ => Err(format!("Invalid reservation status: {}", s)),
        }
    }
}
