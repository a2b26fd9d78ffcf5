//! Reservation queue service
//!
//! Owns eligibility checks, the pickup notification side channel and the
//! queue promotion that runs whenever a copy frees up. Status transitions
//! themselves are guarded in the repository.

use chrono::Utc;

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::{
        borrow::Borrow,
        reservation::{
            CreateReservation, Reservation, ReservationCheck, ReservationDetails, ReservationQuery,
        },
    },
    repository::Repository,
};

use super::email::EmailService;

#[derive(Clone)]
pub struct ReservationsService {
    repository: Repository,
    email: EmailService,
}

impl ReservationsService {
    pub fn new(repository: Repository, email: EmailService) -> Self {
        Self { repository, email }
    }

    pub async fn get(&self, id: i32) -> AppResult<Reservation> {
        self.repository.reservations.get_by_id(id).await
    }

    pub async fn list(&self, query: &ReservationQuery) -> AppResult<(Vec<ReservationDetails>, i64)> {
        self.repository.reservations.list(query).await
    }

    /// The live queue for a title, oldest claim first
    pub async fn queue(&self, book_id: i32) -> AppResult<Vec<ReservationDetails>> {
        self.repository.books.get_by_id(book_id).await?;
        self.repository.reservations.queue_for_book(book_id).await
    }

    /// Would a reservation by this reader on this title be accepted?
    pub async fn check(&self, reader_id: i32, book_id: i32) -> AppResult<ReservationCheck> {
        let mut reasons = Vec::new();

        match self.repository.readers.get_by_id(reader_id).await {
            Ok(reader) => {
                if reader.status != crate::models::reader::ReaderStatus::Active {
                    reasons.push("Reader account is blocked".to_string());
                }
            }
            Err(_) => reasons.push("Reader not found".to_string()),
        }

        match self.repository.books.get_by_id(book_id).await {
            Ok(book) => {
                if book.available_copies > 0 {
                    reasons.push("Copies are available; the title can be borrowed directly".to_string());
                }
            }
            Err(_) => reasons.push("Book not found".to_string()),
        }

        if self.repository.reservations.exists_live(reader_id, book_id).await? {
            reasons.push("Reader already has a live reservation on this title".to_string());
        }

        Ok(ReservationCheck {
            allowed: reasons.is_empty(),
            reasons,
        })
    }

    /// Queue a new claim on an unavailable title
    pub async fn create(&self, request: CreateReservation) -> AppResult<Reservation> {
        let check = self.check(request.reader_id, request.book_id).await?;
        if !check.allowed {
            return Err(AppError::BusinessRule(
                ErrorCode::ReservationNotAllowed,
                check.reasons.join("; "),
            ));
        }

        self.repository.reservations.create(&request).await
    }

    /// Manually notify a pending reservation, holding a copy for the reader
    pub async fn notify(&self, id: i32) -> AppResult<Reservation> {
        let policy = self.repository.policy.get().await?;
        let deadline = Utc::now() + chrono::Duration::days(policy.pickup_window_days as i64);

        let reservation = self.repository.reservations.notify(id, deadline).await?;
        self.send_pickup_email(&reservation).await;

        Ok(reservation)
    }

    /// Confirm pickup; the held copy is issued as a loan
    pub async fn confirm_received(&self, id: i32) -> AppResult<(Reservation, Borrow)> {
        let policy = self.repository.policy.get().await?;
        self.repository
            .reservations
            .confirm_received(id, policy.loan_period_days)
            .await
    }

    /// Cancel a live reservation and re-offer any released copy
    pub async fn cancel(&self, id: i32) -> AppResult<Reservation> {
        let (reservation, released_copy) = self.repository.reservations.cancel(id).await?;

        if released_copy {
            self.process_availability(reservation.book_id).await?;
        }

        Ok(reservation)
    }

    /// Offer a freed copy to the oldest pending reservation, if any
    pub async fn process_availability(&self, book_id: i32) -> AppResult<Option<Reservation>> {
        let policy = self.repository.policy.get().await?;
        let deadline = Utc::now() + chrono::Duration::days(policy.pickup_window_days as i64);

        let promoted = self
            .repository
            .reservations
            .promote_oldest_pending(book_id, deadline)
            .await?;

        if let Some(reservation) = &promoted {
            tracing::info!(
                reservation_id = reservation.id,
                book_id = reservation.book_id,
                "Reservation promoted to notified"
            );
            self.send_pickup_email(reservation).await;
        }

        Ok(promoted)
    }

    /// Cancel every notified reservation past its pickup deadline and
    /// re-offer the released copies. Returns (cancelled, promoted) counts.
    pub async fn auto_cancel(&self) -> AppResult<(u64, u64)> {
        let expired = self.repository.reservations.expired_notified(Utc::now()).await?;

        let mut cancelled = 0;
        let mut promoted = 0;

        for reservation in expired {
            match self.repository.reservations.cancel(reservation.id).await {
                Ok((_, released_copy)) => {
                    cancelled += 1;
                    if released_copy
                        && self.process_availability(reservation.book_id).await?.is_some()
                    {
                        promoted += 1;
                    }
                }
                // Raced with a pickup or a manual cancel; nothing to do
                Err(AppError::BusinessRule(..)) | Err(AppError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        Ok((cancelled, promoted))
    }

    /// Pickup notifications are best effort; a mail failure never fails the
    /// transition that triggered it
    async fn send_pickup_email(&self, reservation: &Reservation) {
        let deadline = match reservation.pickup_deadline {
            Some(deadline) => deadline,
            None => return,
        };

        let reader = match self.repository.readers.get_by_id(reservation.reader_id).await {
            Ok(reader) => reader,
            Err(e) => {
                tracing::warn!("Could not load reader for pickup email: {}", e);
                return;
            }
        };

        let Some(email) = reader.email.as_deref() else {
            return;
        };

        let book = match self.repository.books.get_by_id(reservation.book_id).await {
            Ok(book) => book,
            Err(e) => {
                tracing::warn!("Could not load book for pickup email: {}", e);
                return;
            }
        };

        if let Err(e) = self
            .email
            .send_pickup_notification(email, &reader.full_name, &book.title, deadline)
            .await
        {
            tracing::warn!(
                reservation_id = reservation.id,
                "Failed to send pickup notification: {}",
                e
            );
        }
    }
}
