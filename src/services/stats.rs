//! Summary statistics service

use crate::{
    api::stats::{BorrowStats, FineStats, ReservationStats, StatsResponse},
    error::AppResult,
    models::enums::ReservationStatus,
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Current counters across the circulation workflow
    pub async fn get_stats(&self) -> AppResult<StatsResponse> {
        let borrows = BorrowStats {
            active: self.repository.borrows.count_active().await?,
            overdue: self.repository.borrows.count_overdue().await?,
        };

        let fines = FineStats {
            unpaid: self.repository.fines.count_unpaid().await?,
            unpaid_amount: self.repository.fines.unpaid_total().await?,
        };

        let reservations = ReservationStats {
            pending: self
                .repository
                .reservations
                .count_by_status(ReservationStatus::Pending)
                .await?,
            notified: self
                .repository
                .reservations
                .count_by_status(ReservationStatus::Notified)
                .await?,
        };

        Ok(StatsResponse {
            books: self.repository.books.count().await?,
            readers: self.repository.readers.count().await?,
            borrows,
            fines,
            reservations,
        })
    }
}
