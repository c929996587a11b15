//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Book model from database
///
/// `available_copies` is the shelf count: `total_copies` minus the copies
/// currently out on loan. Circulation maintains it; nothing else writes it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i64,
    /// Business key, unique across the catalog. Editable, unlike a
    /// student's `student_id`.
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub category: Option<String>,
    pub publisher: Option<String>,
    pub total_copies: i64,
    pub available_copies: i64,
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// Copies currently out on loan.
    pub fn issued_copies(&self) -> i64 {
        self.total_copies - self.available_copies
    }
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "isbn is required"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "author is required"))]
    pub author: String,
    pub category: Option<String>,
    pub publisher: Option<String>,
    /// Initial copy count; absent or non-positive values fall back to 1.
    pub total_copies: Option<i64>,
}

/// Update book request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "isbn is required"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "author is required"))]
    pub author: String,
    pub category: Option<String>,
    pub publisher: Option<String>,
    /// New inventory size. `None` leaves both copy counters untouched;
    /// a value recomputes availability around the copies already out.
    pub total_copies: Option<i64>,
}
