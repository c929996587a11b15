//! Student model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Student model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: i64,
    /// Caller-supplied business key, unique and immutable after creation.
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub course: Option<String>,
    pub year: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Create student request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStudent {
    #[validate(length(min = 1, message = "student_id is required"))]
    pub student_id: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    pub phone: Option<String>,
    pub course: Option<String>,
    pub year: Option<String>,
}

/// Update student request; the business key is not part of it.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStudent {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    pub phone: Option<String>,
    pub course: Option<String>,
    pub year: Option<String>,
}
