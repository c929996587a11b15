//! Read-only reporting projections

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Library-wide headline numbers, read from one consistent snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Overview {
    pub total_students: i64,
    pub total_books: i64,
    /// Loans currently open.
    pub total_issued: i64,
    /// Loans closed over all time.
    pub total_returned: i64,
    /// Sum of fines recorded on closed loans.
    pub total_fines: i64,
}

/// Per-student usage row; every student appears, zeros included.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentUsage {
    pub id: i64,
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub course: Option<String>,
    pub year: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Loans ever opened by this student.
    pub total_issued: i64,
    /// Loans still open.
    pub currently_issued: i64,
}

/// Per-book usage row, symmetric to [`StudentUsage`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookUsage {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub category: Option<String>,
    pub publisher: Option<String>,
    pub total_copies: i64,
    pub available_copies: i64,
    pub created_at: DateTime<Utc>,
    pub total_issued: i64,
    pub currently_issued: i64,
}
