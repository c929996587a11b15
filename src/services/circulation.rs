//! Circulation service: issuing and returning books
//!
//! Owns the loan policy: default loan period, fine rate, and the dates
//! stamped on each movement. The availability ledger itself is maintained
//! by the repository's units of work.

use chrono::{Duration, Utc};

use crate::{
    config::CirculationConfig,
    error::{AppError, AppResult},
    models::transaction::{
        IssueRequest, ReturnReceipt, Transaction, TransactionDetails, TransactionFilter,
    },
    repository::Repository,
};

/// Longest loan period the service accepts, in days.
const MAX_DUE_DAYS: i64 = 3650;

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
    config: CirculationConfig,
}

impl CirculationService {
    pub fn new(repository: Repository, config: CirculationConfig) -> Self {
        Self { repository, config }
    }

    /// Issue a book to a student.
    ///
    /// The due date is today plus the requested loan period, falling back to
    /// the configured default. A period outside `1..=MAX_DUE_DAYS` is
    /// rejected rather than silently replaced.
    pub async fn issue(&self, request: IssueRequest) -> AppResult<Transaction> {
        let student_id = request.student_id.trim();
        if student_id.is_empty() {
            return Err(AppError::validation("student_id is required"));
        }

        let due_days = request.due_days.unwrap_or(self.config.default_due_days);
        if due_days <= 0 {
            return Err(AppError::validation("due_days must be positive"));
        }
        // Checked on the raw i64 so an oversized period never reaches the
        // date arithmetic, which cannot represent it.
        if due_days > MAX_DUE_DAYS {
            return Err(AppError::validation(format!(
                "due_days must not exceed {}",
                MAX_DUE_DAYS
            )));
        }

        let issue_date = Utc::now().date_naive();
        let due_date = issue_date + Duration::days(due_days);

        self.repository
            .transactions
            .issue(student_id, request.book_id, issue_date, due_date)
            .await
    }

    /// Return a loan, computing any overdue fine as of today.
    pub async fn return_loan(&self, transaction_id: i64) -> AppResult<ReturnReceipt> {
        let returned_on = Utc::now().date_naive();
        self.repository
            .transactions
            .return_loan(transaction_id, returned_on, self.config.fine_per_day)
            .await
    }

    /// Get a single transaction by id
    pub async fn get_transaction(&self, id: i64) -> AppResult<Transaction> {
        self.repository.transactions.get_by_id(id).await
    }

    /// List transactions, optionally narrowed by status and/or student
    pub async fn list(&self, filter: TransactionFilter) -> AppResult<Vec<TransactionDetails>> {
        self.repository.transactions.list(&filter).await
    }
}
