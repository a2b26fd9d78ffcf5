//! Circulation service: borrow, return and renew
//!
//! The return path drives the pure [`ReturnFlow`] state machine and persists
//! whatever slip it produces; the borrow archive, copy restock, fine record
//! and optional payment all commit in a single transaction.

use chrono::{DateTime, Utc};

use crate::{
    circulation::{PaymentDetails, ReturnEvent, ReturnFlow, ReturnSlip},
    error::{AppError, AppResult, ErrorCode},
    models::{
        borrow::{Borrow, BorrowDetails, CreateBorrow, RenewalRecord},
        enums::BookCondition,
        fine::Fine,
    },
    repository::Repository,
};

use super::reservations::ReservationsService;

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
    reservations: ReservationsService,
}

impl CirculationService {
    pub fn new(repository: Repository, reservations: ReservationsService) -> Self {
        Self {
            repository,
            reservations,
        }
    }

    pub async fn get_borrow(&self, id: i32) -> AppResult<Borrow> {
        self.repository.borrows.get_by_id(id).await
    }

    /// Get active borrows for a reader
    pub async fn get_reader_borrows(&self, reader_id: i32) -> AppResult<Vec<BorrowDetails>> {
        // Verify reader exists
        self.repository.readers.get_by_id(reader_id).await?;
        self.repository.borrows.get_reader_borrows(reader_id).await
    }

    /// Issue a loan
    pub async fn borrow(&self, request: CreateBorrow) -> AppResult<Borrow> {
        let policy = self.repository.policy.get().await?;
        self.repository
            .borrows
            .create(&request, policy.loan_period_days, policy.max_active_borrows)
            .await
    }

    /// Return a borrowed book
    ///
    /// When the assessment yields a fine, a supplied payment settles it on
    /// the spot; without one the fine stays unpaid on the reader's account.
    /// A freed copy is immediately offered to the reservation queue.
    pub async fn return_borrow(
        &self,
        borrow_id: i32,
        returned_date: Option<DateTime<Utc>>,
        condition: Option<BookCondition>,
        notes: Option<String>,
        payment: Option<PaymentDetails>,
    ) -> AppResult<(ReturnSlip, Option<Fine>)> {
        let borrow = self.repository.borrows.get_by_id(borrow_id).await?;
        let policy = self.repository.policy.get().await?;
        let now = Utc::now();

        let flow = ReturnFlow::new(borrow, policy.fine_policy()).handle(
            ReturnEvent::Submit {
                returned_date: Some(returned_date.unwrap_or(now)),
                condition,
                notes,
            },
            now,
        )?;

        let flow = if matches!(flow, ReturnFlow::AwaitingPayment { .. }) {
            match payment {
                Some(payment) => flow.handle(ReturnEvent::ConfirmPayment(payment), now)?,
                None => flow.handle(ReturnEvent::DeferPayment, now)?,
            }
        } else {
            flow
        };

        let slip = flow
            .into_slip()
            .ok_or_else(|| AppError::Internal("Return flow did not complete".to_string()))?;

        let (fine, copy_freed) = self.repository.borrows.complete_return(&slip).await?;

        if copy_freed {
            self.reservations.process_availability(slip.book_id).await?;
        }

        Ok((slip, fine))
    }

    /// Renew a loan to a new due date
    pub async fn renew(
        &self,
        borrow_id: i32,
        new_due_date: DateTime<Utc>,
    ) -> AppResult<RenewalRecord> {
        let borrow = self.repository.borrows.get_by_id(borrow_id).await?;

        if borrow.returned_date.is_some() {
            return Err(AppError::Conflict(
                ErrorCode::AlreadyReturned,
                "Cannot renew a returned loan".to_string(),
            ));
        }

        let policy = self.repository.policy.get().await?;
        let plan = policy
            .renewal_policy()
            .plan(borrow.due_date, new_due_date, borrow.renewal_count)?;

        self.repository.borrows.renew(borrow_id, &plan).await
    }
}
