//! Books repository for database operations

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: SqlitePool,
}

impl BooksRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get book by id
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("book", id))
    }

    /// Get book by ISBN
    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE isbn = ?1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("book", isbn))
    }

    /// Check if an ISBN already exists, optionally excluding one book
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = ?1 AND id != ?2)")
                .bind(isbn)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = ?1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Create a new book with every copy on the shelf, returning the id
    pub async fn create(&self, book: &CreateBook) -> AppResult<i64> {
        // Absent or non-positive counts fall back to a single copy.
        let copies = book.total_copies.filter(|&n| n > 0).unwrap_or(1);
        let now = Utc::now();

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO books (isbn, title, author, category, publisher,
                               total_copies, available_copies, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, ?7)
            RETURNING id
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.category)
        .bind(&book.publisher)
        .bind(copies)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Update an existing book.
    ///
    /// When `total_copies` is supplied the availability counter is recomputed
    /// in the same statement from the copies currently out on loan, clamped
    /// at zero. The right-hand side reads the pre-update column values, so
    /// the issued count survives the resize.
    pub async fn update(&self, id: i64, book: &UpdateBook) -> AppResult<Book> {
        let result = if let Some(total) = book.total_copies {
            let total = total.max(1);
            sqlx::query(
                r#"
                UPDATE books
                SET isbn = ?2, title = ?3, author = ?4, category = ?5, publisher = ?6,
                    total_copies = ?7,
                    available_copies = MAX(0, ?7 - (total_copies - available_copies))
                WHERE id = ?1
                "#,
            )
            .bind(id)
            .bind(&book.isbn)
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.category)
            .bind(&book.publisher)
            .bind(total)
            .execute(&self.pool)
            .await?
        } else {
            sqlx::query(
                r#"
                UPDATE books
                SET isbn = ?2, title = ?3, author = ?4, category = ?5, publisher = ?6
                WHERE id = ?1
                "#,
            )
            .bind(id)
            .bind(&book.isbn)
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.category)
            .bind(&book.publisher)
            .execute(&self.pool)
            .await?
        };

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("book", id));
        }

        self.get_by_id(id).await
    }

    /// Delete a book.
    ///
    /// Refused while copies are out on loan; closed loan history goes with
    /// the record. Check and delete share one database transaction, same as
    /// student deletion.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = ?1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(AppError::not_found("book", id));
        }

        let open_loans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM transactions WHERE book_id = ?1 AND status = 'issued'",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if open_loans > 0 {
            return Err(AppError::Conflict(format!(
                "book {} has {} open loan(s)",
                id, open_loans
            )));
        }

        sqlx::query("DELETE FROM books WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Search books by title, author, ISBN, or category; newest first.
    ///
    /// A blank term lists the whole catalog.
    pub async fn search(&self, term: Option<&str>) -> AppResult<Vec<Book>> {
        match term.map(str::trim) {
            Some(term) if !term.is_empty() => {
                let pattern = format!("%{}%", term.to_lowercase());
                let books = sqlx::query_as::<_, Book>(
                    r#"
                    SELECT * FROM books
                    WHERE LOWER(title) LIKE ?1
                       OR LOWER(author) LIKE ?1
                       OR LOWER(isbn) LIKE ?1
                       OR LOWER(category) LIKE ?1
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?;
                Ok(books)
            }
            _ => {
                let books = sqlx::query_as::<_, Book>(
                    "SELECT * FROM books ORDER BY created_at DESC, id DESC",
                )
                .fetch_all(&self.pool)
                .await?;
                Ok(books)
            }
        }
    }
}
