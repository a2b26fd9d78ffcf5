//! Circulation policy service

use validator::Validate;

use crate::{
    error::AppResult,
    models::policy::{CirculationPolicy, UpdatePolicy},
    repository::Repository,
};

#[derive(Clone)]
pub struct PolicyService {
    repository: Repository,
}

impl PolicyService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get(&self) -> AppResult<CirculationPolicy> {
        self.repository.policy.get().await
    }

    pub async fn update(&self, request: UpdatePolicy) -> AppResult<CirculationPolicy> {
        request.validate()?;
        self.repository.policy.update(&request).await
    }
}
