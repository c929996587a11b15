//! Reporting service: read-only projections over the catalog and loans
//!
//! Each report is a single statement, so its numbers come from one
//! consistent snapshot of the database. Nothing here mutates state.

use crate::{
    error::AppResult,
    models::report::{BookUsage, Overview, StudentUsage},
    repository::Repository,
};

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
}

impl ReportsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Library-wide totals: population counts, open and closed loans, and
    /// the fines collected on closed loans.
    pub async fn overview(&self) -> AppResult<Overview> {
        let overview = sqlx::query_as::<_, Overview>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM students) AS total_students,
                (SELECT COUNT(*) FROM books) AS total_books,
                (SELECT COUNT(*) FROM transactions WHERE status = 'issued') AS total_issued,
                (SELECT COUNT(*) FROM transactions WHERE status = 'returned') AS total_returned,
                (SELECT COALESCE(SUM(fine_amount), 0) FROM transactions
                  WHERE status = 'returned') AS total_fines
            "#,
        )
        .fetch_one(&self.repository.pool)
        .await?;

        Ok(overview)
    }

    /// Per-student usage; every student appears, including those who never
    /// borrowed anything.
    pub async fn student_report(&self) -> AppResult<Vec<StudentUsage>> {
        let query = usage_query("students", "t.student_id = base.student_id");
        let rows = sqlx::query_as::<_, StudentUsage>(&query)
            .fetch_all(&self.repository.pool)
            .await?;
        Ok(rows)
    }

    /// Per-book usage; every book appears, including never-borrowed ones.
    pub async fn book_report(&self) -> AppResult<Vec<BookUsage>> {
        let query = usage_query("books", "t.book_id = base.id");
        let rows = sqlx::query_as::<_, BookUsage>(&query)
            .fetch_all(&self.repository.pool)
            .await?;
        Ok(rows)
    }
}

/// The student and book reports are the same projection over different base
/// tables; build the statement once, parameterized by the loan join.
fn usage_query(table: &str, join_on: &str) -> String {
    format!(
        r#"
        SELECT base.*,
               COUNT(t.id) AS total_issued,
               COUNT(CASE WHEN t.status = 'issued' THEN 1 END) AS currently_issued
        FROM {table} base
        LEFT JOIN transactions t ON {join_on}
        GROUP BY base.id
        ORDER BY base.created_at DESC, base.id DESC
        "#
    )
}
