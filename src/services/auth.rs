//! Authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::reader::{Claims, Reader, ReaderStatus},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Verify credentials and issue a JWT
    pub async fn login(&self, login: &str, password: &str) -> AppResult<(String, Reader)> {
        let reader = self
            .repository
            .readers
            .get_by_login(login)
            .await
            .map_err(|_| AppError::Authentication("Invalid credentials".to_string()))?;

        let stored = reader
            .password
            .as_deref()
            .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

        let parsed = PasswordHash::new(stored)
            .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;

        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }

        if reader.status == ReaderStatus::Blocked {
            return Err(AppError::Authorization("Account is blocked".to_string()));
        }

        let now = Utc::now();
        let claims = Claims {
            sub: reader.login.clone(),
            reader_id: reader.id,
            role: reader.role,
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(self.config.jwt_expiration_hours as i64))
                .timestamp(),
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, reader))
    }

    /// The account behind a set of claims
    pub async fn me(&self, reader_id: i32) -> AppResult<Reader> {
        self.repository.readers.get_by_id(reader_id).await
    }
}

/// Hash a password with argon2 and a fresh salt
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}
