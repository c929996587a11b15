//! Repository layer for database operations

pub mod books;
pub mod students;
pub mod transactions;

use sqlx::SqlitePool;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: SqlitePool,
    pub students: students::StudentsRepository,
    pub books: books::BooksRepository,
    pub transactions: transactions::TransactionsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            students: students::StudentsRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            transactions: transactions::TransactionsRepository::new(pool.clone()),
            pool,
        }
    }
}
