//! Circulation domain core
//!
//! Pure lending rules with no I/O: fine assessment, the return workflow
//! state machine, renewal planning and reservation status transitions.
//! The service layer feeds these from the database and persists whatever
//! they decide; everything here is testable without a running server.

pub mod fine;
pub mod renewal;
pub mod reservation;
pub mod return_flow;

use thiserror::Error;

use crate::error::{AppError, ErrorCode};
use crate::models::enums::ReservationStatus;

pub use fine::{FineAssessment, FinePolicy};
pub use renewal::{RenewalPlan, RenewalPolicy};
pub use return_flow::{PaymentDetails, ReturnEvent, ReturnFlow, ReturnSlip};

/// Errors produced by the circulation rules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("missing required fields: {0}")]
    MissingFields(String),

    #[error("new due date must be after the current due date")]
    RenewalNotForward,

    #[error("renewal of {days} days exceeds the {max}-day limit")]
    RenewalTooLong { days: i64, max: i64 },

    #[error("maximum renewals reached ({count}/{max})")]
    MaxRenewalsReached { count: i16, max: i16 },

    #[error("cannot {action} a {status} reservation")]
    InvalidTransition {
        status: ReservationStatus,
        action: &'static str,
    },

    #[error("event {event} is not valid in state {state}")]
    UnexpectedEvent {
        state: &'static str,
        event: &'static str,
    },
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match &err {
            WorkflowError::MissingFields(_) | WorkflowError::RenewalNotForward => {
                AppError::Validation(err.to_string())
            }
            WorkflowError::RenewalTooLong { .. } => {
                AppError::BusinessRule(ErrorCode::RenewalTooLong, err.to_string())
            }
            WorkflowError::MaxRenewalsReached { .. } => {
                AppError::BusinessRule(ErrorCode::MaxRenewalsReached, err.to_string())
            }
            WorkflowError::InvalidTransition { .. } => {
                AppError::BusinessRule(ErrorCode::InvalidTransition, err.to_string())
            }
            WorkflowError::UnexpectedEvent { .. } => AppError::Internal(err.to_string()),
        }
    }
}
