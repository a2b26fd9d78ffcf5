//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// List books with optional filters and pagination
    pub async fn list(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(25).clamp(1, 100);

        let title = query.title.as_ref().map(|t| format!("%{}%", t));
        let author = query.author.as_ref().map(|a| format!("%{}%", a));

        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT * FROM books
            WHERE ($1::text IS NULL OR title ILIKE $1)
              AND ($2::text IS NULL OR author ILIKE $2)
              AND ($3::text IS NULL OR isbn = $3)
            ORDER BY title
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(&title)
        .bind(&author)
        .bind(&query.isbn)
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM books
            WHERE ($1::text IS NULL OR title ILIKE $1)
              AND ($2::text IS NULL OR author ILIKE $2)
              AND ($3::text IS NULL OR isbn = $3)
            "#,
        )
        .bind(&title)
        .bind(&author)
        .bind(&query.isbn)
        .fetch_one(&self.pool)
        .await?;

        Ok((books, total))
    }

    /// Create a new book; all copies start available
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let copies = book.total_copies.unwrap_or(1);

        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (isbn, title, author, publisher, published_year, category,
                               location, total_copies, available_copies, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8, NOW())
            RETURNING *
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(book.published_year)
        .bind(&book.category)
        .bind(&book.location)
        .bind(copies)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a book; a change in total copies shifts availability by the
    /// same delta and must not take availability below zero
    pub async fn update(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        let current = self.get_by_id(id).await?;

        if let Some(new_total) = update.total_copies {
            let delta = new_total - current.total_copies;
            if current.available_copies + delta < 0 {
                return Err(AppError::BusinessRule(
                    ErrorCode::BadValue,
                    format!(
                        "Cannot reduce to {} copies: {} are out on loan or held",
                        new_total,
                        current.total_copies - current.available_copies
                    ),
                ));
            }
        }

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                isbn = COALESCE($2, isbn),
                title = COALESCE($3, title),
                author = COALESCE($4, author),
                publisher = COALESCE($5, publisher),
                published_year = COALESCE($6, published_year),
                category = COALESCE($7, category),
                location = COALESCE($8, location),
                available_copies = available_copies + COALESCE($9 - total_copies, 0),
                total_copies = COALESCE($9, total_copies),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.isbn)
        .bind(&update.title)
        .bind(&update.author)
        .bind(&update.publisher)
        .bind(update.published_year)
        .bind(&update.category)
        .bind(&update.location)
        .bind(update.total_copies)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(updated)
    }

    /// Delete a book with no copies out and no live reservations
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let on_loan: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrows WHERE book_id = $1 AND returned_date IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if on_loan {
            return Err(AppError::BusinessRule(
                ErrorCode::BookNotAvailable,
                "Book has copies out on loan".to_string(),
            ));
        }

        let reserved: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reservations WHERE book_id = $1 AND status IN ('pending', 'notified'))",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if reserved {
            return Err(AppError::BusinessRule(
                ErrorCode::ReservationNotAllowed,
                "Book has live reservations".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }

    /// Count cataloged titles
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
