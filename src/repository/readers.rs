//! Readers repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::reader::{CreateReader, Reader, ReaderQuery, ReaderRow, Role, UpdateReader},
};

#[derive(Clone)]
pub struct ReadersRepository {
    pool: Pool<Postgres>,
}

impl ReadersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get reader by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Reader> {
        let row = sqlx::query_as::<_, ReaderRow>("SELECT * FROM readers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reader with id {} not found", id)))?;

        Ok(row.into())
    }

    /// Get reader by login, for authentication
    pub async fn get_by_login(&self, login: &str) -> AppResult<Reader> {
        let row = sqlx::query_as::<_, ReaderRow>("SELECT * FROM readers WHERE login = $1")
            .bind(login)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reader {} not found", login)))?;

        Ok(row.into())
    }

    /// List readers with optional filters and pagination
    pub async fn list(&self, query: &ReaderQuery) -> AppResult<(Vec<Reader>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(25).clamp(1, 100);

        let name = query.name.as_ref().map(|n| format!("%{}%", n));

        let rows = sqlx::query_as::<_, ReaderRow>(
            r#"
            SELECT * FROM readers
            WHERE ($1::text IS NULL OR full_name ILIKE $1)
              AND ($2::text IS NULL OR card_number = $2)
            ORDER BY full_name
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&name)
        .bind(&query.card_number)
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM readers
            WHERE ($1::text IS NULL OR full_name ILIKE $1)
              AND ($2::text IS NULL OR card_number = $2)
            "#,
        )
        .bind(&name)
        .bind(&query.card_number)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(Reader::from).collect(), total))
    }

    /// Create a new reader account
    pub async fn create(
        &self,
        reader: &CreateReader,
        card_number: &str,
        password_hash: Option<&str>,
    ) -> AppResult<Reader> {
        let duplicate: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM readers WHERE login = $1)")
                .bind(&reader.login)
                .fetch_one(&self.pool)
                .await?;

        if duplicate {
            return Err(AppError::Conflict(
                ErrorCode::Duplicate,
                format!("Login {} is already taken", reader.login),
            ));
        }

        let role = reader.role.unwrap_or(Role::Reader);

        let row = sqlx::query_as::<_, ReaderRow>(
            r#"
            INSERT INTO readers (card_number, login, password, full_name, email, phone,
                                 address, role, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'active', NOW())
            RETURNING *
            "#,
        )
        .bind(card_number)
        .bind(&reader.login)
        .bind(password_hash)
        .bind(&reader.full_name)
        .bind(&reader.email)
        .bind(&reader.phone)
        .bind(&reader.address)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Update a reader account
    pub async fn update(
        &self,
        id: i32,
        update: &UpdateReader,
        password_hash: Option<&str>,
    ) -> AppResult<Reader> {
        let row = sqlx::query_as::<_, ReaderRow>(
            r#"
            UPDATE readers SET
                login = COALESCE($2, login),
                password = COALESCE($3, password),
                full_name = COALESCE($4, full_name),
                email = COALESCE($5, email),
                phone = COALESCE($6, phone),
                address = COALESCE($7, address),
                role = COALESCE($8, role),
                status = COALESCE($9, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.login)
        .bind(password_hash)
        .bind(&update.full_name)
        .bind(&update.email)
        .bind(&update.phone)
        .bind(&update.address)
        .bind(update.role.map(|r| r.as_str()))
        .bind(update.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Reader with id {} not found", id)))?;

        Ok(row.into())
    }

    /// Delete a reader with no copies out on loan
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let has_borrows: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrows WHERE reader_id = $1 AND returned_date IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if has_borrows {
            return Err(AppError::BusinessRule(
                ErrorCode::MaxBorrowsReached,
                "Reader still has books out on loan".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM readers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Reader with id {} not found", id)));
        }

        Ok(())
    }

    /// Count reader accounts
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM readers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
