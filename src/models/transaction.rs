//! Loan transaction model, status lifecycle, and fine arithmetic

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle of a loan. `Returned` is terminal; there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TransactionStatus {
    Issued,
    Returned,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Issued => "issued",
            TransactionStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "issued" => Ok(TransactionStatus::Issued),
            "returned" => Ok(TransactionStatus::Returned),
            other => Err(format!("unknown transaction status '{}'", other)),
        }
    }
}

/// Loan transaction model from database
///
/// Borrowers are referenced by their `student_id` business key, books by
/// surrogate id. Dates are calendar days; the timestamp is only on
/// `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: i64,
    pub student_id: String,
    pub book_id: i64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: TransactionStatus,
    pub fine_amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Transaction joined with the student and book fields listings display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransactionDetails {
    pub id: i64,
    pub student_id: String,
    pub book_id: i64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: TransactionStatus,
    pub fine_amount: i64,
    pub created_at: DateTime<Utc>,
    pub student_name: String,
    pub student_email: String,
    pub book_title: String,
    pub book_author: String,
    pub isbn: String,
}

/// Issue (borrow) request
#[derive(Debug, Clone, Deserialize)]
pub struct IssueRequest {
    pub student_id: String,
    pub book_id: i64,
    /// Loan period in days; `None` takes the configured default.
    pub due_days: Option<i64>,
}

/// Outcome of returning a loan
#[derive(Debug, Clone, Serialize)]
pub struct ReturnReceipt {
    pub transaction_id: i64,
    pub return_date: NaiveDate,
    pub days_late: i64,
    pub fine_amount: i64,
}

/// Listing filter; conditions are ANDed when both are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFilter {
    pub status: Option<TransactionStatus>,
    pub student_id: Option<String>,
}

/// Whole days past due, zero for an on-time return.
pub fn days_late(due_date: NaiveDate, returned_on: NaiveDate) -> i64 {
    (returned_on - due_date).num_days().max(0)
}

/// Overdue fine at calendar-day granularity: days late times the per-day rate.
pub fn late_fine(due_date: NaiveDate, returned_on: NaiveDate, fine_per_day: i64) -> i64 {
    days_late(due_date, returned_on) * fine_per_day
}
