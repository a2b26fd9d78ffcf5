//! Reader account management service

use rand::Rng;
use validator::Validate;

use crate::{
    error::AppResult,
    models::reader::{CreateReader, Reader, ReaderQuery, Role, UpdateReader},
    repository::Repository,
};

use super::auth::hash_password;

#[derive(Clone)]
pub struct ReadersService {
    repository: Repository,
}

impl ReadersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &ReaderQuery) -> AppResult<(Vec<Reader>, i64)> {
        self.repository.readers.list(query).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Reader> {
        self.repository.readers.get_by_id(id).await
    }

    /// Register a new account with a generated membership card number
    pub async fn create(&self, request: CreateReader) -> AppResult<Reader> {
        request.validate()?;

        let card_number = generate_card_number();
        let password_hash = match &request.password {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        self.repository
            .readers
            .create(&request, &card_number, password_hash.as_deref())
            .await
    }

    pub async fn update(&self, id: i32, request: UpdateReader) -> AppResult<Reader> {
        request.validate()?;

        let password_hash = match &request.password {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        self.repository
            .readers
            .update(id, &request, password_hash.as_deref())
            .await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.readers.delete(id).await
    }

    /// Seed an admin account on an empty database so the API can be reached
    /// at all. The default credentials must be changed immediately.
    pub async fn ensure_default_admin(&self) -> AppResult<()> {
        if self.repository.readers.count().await? > 0 {
            return Ok(());
        }

        let admin = CreateReader {
            login: "admin".to_string(),
            password: Some("admin".to_string()),
            full_name: "Administrator".to_string(),
            email: None,
            phone: None,
            address: None,
            role: Some(Role::Admin),
        };

        self.create(admin).await?;
        tracing::warn!("Created default admin account (admin/admin); change its password");

        Ok(())
    }
}

/// Membership card numbers: FOL- followed by eight digits
fn generate_card_number() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..=99_999_999);
    format!("FOL-{:08}", n)
}
