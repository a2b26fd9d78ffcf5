//! Book (catalog title) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book model from database
///
/// Copies are tracked as counters on the title. `available_copies` excludes
/// copies out on loan and copies held for a notified reservation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub isbn: Option<String>,
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub published_year: Option<i16>,
    pub category: Option<String>,
    /// Shelf location code
    pub location: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Book query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub author: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    pub isbn: Option<String>,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub published_year: Option<i16>,
    pub category: Option<String>,
    pub location: Option<String>,
    #[validate(range(min = 1, message = "A book needs at least one copy"))]
    pub total_copies: Option<i32>,
}

/// Update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub published_year: Option<i16>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub total_copies: Option<i32>,
}

/// Paginated book listing
#[derive(Debug, Serialize, ToSchema)]
pub struct BookPage {
    pub items: Vec<Book>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}
