//! Fine management service

use chrono::Utc;
use validator::Validate;

use crate::{
    circulation::FineAssessment,
    error::AppResult,
    models::fine::{AssessFineRequest, CreateFine, Fine, PayFine},
    repository::Repository,
};

#[derive(Clone)]
pub struct FinesService {
    repository: Repository,
}

impl FinesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get(&self, id: i32) -> AppResult<Fine> {
        self.repository.fines.get_by_id(id).await
    }

    /// Get fines for a reader
    pub async fn get_reader_fines(&self, reader_id: i32) -> AppResult<Vec<Fine>> {
        // Verify reader exists
        self.repository.readers.get_by_id(reader_id).await?;
        self.repository.fines.get_reader_fines(reader_id).await
    }

    /// Record a fine by hand, outside the return flow
    pub async fn create(&self, request: CreateFine) -> AppResult<Fine> {
        request.validate()?;
        self.repository.readers.get_by_id(request.reader_id).await?;
        self.repository.books.get_by_id(request.book_id).await?;
        self.repository.fines.create(&request).await
    }

    /// Settle a fine; only ever succeeds once per fine
    pub async fn pay(&self, id: i32, request: PayFine) -> AppResult<Fine> {
        self.repository
            .fines
            .pay(id, request.payment_method, request.transaction_code.as_deref())
            .await
    }

    /// Preview what a return would cost, without touching any record
    pub async fn assess(&self, request: AssessFineRequest) -> AppResult<FineAssessment> {
        let policy = self.repository.policy.get().await?;
        Ok(policy.fine_policy().assess(
            request.due_date,
            request.returned_date.unwrap_or_else(Utc::now),
            request.condition.unwrap_or_default(),
        ))
    }
}
