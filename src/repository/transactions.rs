//! Transactions repository: issue/return units of work and listings
//!
//! Issuing and returning each touch two rows, the loan and the book's
//! availability counter, so both run inside a single database transaction.
//! [`sqlx::Transaction`] rolls back on drop, which covers every early-return
//! path without explicit cleanup.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::{
    error::{AppError, AppResult},
    models::transaction::{
        days_late, late_fine, ReturnReceipt, Transaction, TransactionDetails, TransactionFilter,
    },
};

#[derive(Clone)]
pub struct TransactionsRepository {
    pool: SqlitePool,
}

impl TransactionsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get transaction by id
    pub async fn get_by_id(&self, id: i64) -> AppResult<Transaction> {
        sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("transaction", id))
    }

    /// Issue a book to a student: open the loan and take one copy off the
    /// shelf, atomically.
    ///
    /// The decrement carries its own `available_copies > 0` guard, making
    /// the availability check and the write a single statement. Two issues
    /// racing for the last copy serialize on the row; the loser matches
    /// nothing and gets `Unavailable`.
    pub async fn issue(
        &self,
        student_id: &str,
        book_id: i64,
        issue_date: NaiveDate,
        due_date: NaiveDate,
    ) -> AppResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        let student_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE student_id = ?1)")
                .bind(student_id)
                .fetch_one(&mut *tx)
                .await?;
        if !student_exists {
            return Err(AppError::not_found("student", student_id));
        }

        let book_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = ?1)")
                .bind(book_id)
                .fetch_one(&mut *tx)
                .await?;
        if !book_exists {
            return Err(AppError::not_found("book", book_id));
        }

        let taken = sqlx::query(
            r#"
            UPDATE books SET available_copies = available_copies - 1
            WHERE id = ?1 AND available_copies > 0
            "#,
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?;
        if taken.rows_affected() == 0 {
            return Err(AppError::Unavailable(format!(
                "book {} has no available copies",
                book_id
            )));
        }

        let now = Utc::now();
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions
                (student_id, book_id, issue_date, due_date, status, fine_amount, created_at)
            VALUES (?1, ?2, ?3, ?4, 'issued', 0, ?5)
            RETURNING *
            "#,
        )
        .bind(student_id)
        .bind(book_id)
        .bind(issue_date)
        .bind(due_date)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            transaction_id = transaction.id,
            student_id,
            book_id,
            due_date = %due_date,
            "book issued"
        );

        Ok(transaction)
    }

    /// Return a loan: close it, record the fine, and put the copy back,
    /// atomically.
    ///
    /// An unknown id and an already-returned loan both come back as
    /// `NotFound`; returning is idempotent in effect, never in outcome.
    pub async fn return_loan(
        &self,
        transaction_id: i64,
        returned_on: NaiveDate,
        fine_per_day: i64,
    ) -> AppResult<ReturnReceipt> {
        let mut tx = self.pool.begin().await?;

        let open: Option<(i64, NaiveDate)> = sqlx::query_as(
            "SELECT book_id, due_date FROM transactions WHERE id = ?1 AND status = 'issued'",
        )
        .bind(transaction_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((book_id, due_date)) = open else {
            return Err(AppError::NotFound(format!(
                "transaction {} not found or already returned",
                transaction_id
            )));
        };

        let late = days_late(due_date, returned_on);
        let fine_amount = late_fine(due_date, returned_on, fine_per_day);

        // Status guard repeated so a racing return closes the row only once.
        let closed = sqlx::query(
            r#"
            UPDATE transactions
            SET status = 'returned', return_date = ?2, fine_amount = ?3
            WHERE id = ?1 AND status = 'issued'
            "#,
        )
        .bind(transaction_id)
        .bind(returned_on)
        .bind(fine_amount)
        .execute(&mut *tx)
        .await?;
        if closed.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "transaction {} not found or already returned",
                transaction_id
            )));
        }

        let restocked = sqlx::query(
            r#"
            UPDATE books SET available_copies = available_copies + 1
            WHERE id = ?1 AND available_copies < total_copies
            "#,
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?;
        if restocked.rows_affected() == 0 {
            // Inventory was shrunk below the copies out on loan; the shelf
            // count is already at its ceiling and the returned copy is
            // absorbed rather than pushed past total_copies.
            warn!(
                book_id,
                transaction_id, "returned copy absorbed, availability already at total_copies"
            );
        }

        tx.commit().await?;

        info!(
            transaction_id,
            book_id, days_late = late, fine_amount, "book returned"
        );

        Ok(ReturnReceipt {
            transaction_id,
            return_date: returned_on,
            days_late: late,
            fine_amount,
        })
    }

    /// List transactions with the student and book fields displays need,
    /// newest first.
    pub async fn list(&self, filter: &TransactionFilter) -> AppResult<Vec<TransactionDetails>> {
        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(status) = filter.status {
            params.push(status.as_str().to_string());
            conditions.push(format!("t.status = ?{}", params.len()));
        }

        if let Some(ref student_id) = filter.student_id {
            params.push(student_id.clone());
            conditions.push(format!("t.student_id = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            r#"
            SELECT t.id, t.student_id, t.book_id, t.issue_date, t.due_date,
                   t.return_date, t.status, t.fine_amount, t.created_at,
                   s.name AS student_name, s.email AS student_email,
                   b.title AS book_title, b.author AS book_author, b.isbn
            FROM transactions t
            JOIN students s ON t.student_id = s.student_id
            JOIN books b ON t.book_id = b.id
            {}
            ORDER BY t.created_at DESC, t.id DESC
            "#,
            where_clause
        );

        let mut builder = sqlx::query_as::<_, TransactionDetails>(&query);
        for param in &params {
            builder = builder.bind(param);
        }

        let transactions = builder.fetch_all(&self.pool).await?;
        Ok(transactions)
    }
}
