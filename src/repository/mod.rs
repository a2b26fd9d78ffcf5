//! Repository layer for database operations

pub mod books;
pub mod borrows;
pub mod fines;
pub mod policy;
pub mod readers;
pub mod reservations;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub readers: readers::ReadersRepository,
    pub borrows: borrows::BorrowsRepository,
    pub fines: fines::FinesRepository,
    pub reservations: reservations::ReservationsRepository,
    pub policy: policy::PolicyRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            readers: readers::ReadersRepository::new(pool.clone()),
            borrows: borrows::BorrowsRepository::new(pool.clone()),
            fines: fines::FinesRepository::new(pool.clone()),
            reservations: reservations::ReservationsRepository::new(pool.clone()),
            policy: policy::PolicyRepository::new(pool.clone()),
            pool,
        }
    }
}
