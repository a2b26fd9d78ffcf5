//! Reservation status transitions
//!
//! The queue states form a small monotonic machine: pending -> notified ->
//! received, with cancellation allowed from either non-terminal state. The
//! repository enforces the same guards with conditional UPDATEs; this module
//! is the single definition of what is allowed.

use chrono::{DateTime, Utc};

use super::WorkflowError;
use crate::models::enums::ReservationStatus;

/// Operations the management API exposes on a reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationAction {
    Notify,
    ConfirmReceived,
    Cancel,
}

impl ReservationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationAction::Notify => "notify",
            ReservationAction::ConfirmReceived => "confirm receipt of",
            ReservationAction::Cancel => "cancel",
        }
    }

    /// The only status this action may be applied from
    pub fn expected_status(&self) -> &'static [ReservationStatus] {
        match self {
            ReservationAction::Notify => &[ReservationStatus::Pending],
            ReservationAction::ConfirmReceived => &[ReservationStatus::Notified],
            ReservationAction::Cancel => {
                &[ReservationStatus::Pending, ReservationStatus::Notified]
            }
        }
    }
}

/// Compute the status an action leads to, or reject the transition
pub fn apply(
    status: ReservationStatus,
    action: ReservationAction,
) -> Result<ReservationStatus, WorkflowError> {
    if !action.expected_status().contains(&status) {
        return Err(WorkflowError::InvalidTransition {
            status,
            action: action.as_str(),
        });
    }
    Ok(match action {
        ReservationAction::Notify => ReservationStatus::Notified,
        ReservationAction::ConfirmReceived => ReservationStatus::Received,
        ReservationAction::Cancel => ReservationStatus::Cancelled,
    })
}

/// Display-time expiry predicate: notified and past the pickup deadline.
/// Not a stored state; recomputed wherever it is shown or acted on.
pub fn is_expired(
    status: ReservationStatus,
    pickup_deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    status == ReservationStatus::Notified
        && pickup_deadline.map(|deadline| deadline < now).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ReservationAction::*;
    use ReservationStatus::*;

    #[test]
    fn test_happy_path() {
        let status = apply(Pending, Notify).unwrap();
        assert_eq!(status, Notified);
        let status = apply(status, ConfirmReceived).unwrap();
        assert_eq!(status, Received);
        assert!(status.is_terminal());
    }

    #[test]
    fn test_cancel_from_non_terminal_states() {
        assert_eq!(apply(Pending, Cancel).unwrap(), Cancelled);
        assert_eq!(apply(Notified, Cancel).unwrap(), Cancelled);
    }

    #[test]
    fn test_no_transition_out_of_terminal_states() {
        for terminal in [Received, Cancelled] {
            for action in [Notify, ConfirmReceived, Cancel] {
                assert!(apply(terminal, action).is_err());
            }
        }
    }

    #[test]
    fn test_received_requires_notified() {
        assert!(apply(Pending, ConfirmReceived).is_err());
        assert!(apply(Notified, Notify).is_err());
    }

    #[test]
    fn test_expiry_predicate() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let past = Some(now - chrono::Duration::days(1));
        let future = Some(now + chrono::Duration::days(1));
        assert!(is_expired(Notified, past, now));
        assert!(!is_expired(Notified, future, now));
        assert!(!is_expired(Notified, None, now));
        // Only notified reservations expire
        assert!(!is_expired(Pending, past, now));
        assert!(!is_expired(Received, past, now));
        assert!(!is_expired(Cancelled, past, now));
    }
}
