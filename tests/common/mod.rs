//! Shared helpers for integration tests

use chrono::{Duration, Utc};
use libris::models::{CreateBook, CreateStudent};
use libris::{AppConfig, Library};

/// Library wired to a fresh single-connection in-memory database.
pub async fn test_library() -> Library {
    libris::logging::init_test();
    Library::connect(AppConfig::in_memory())
        .await
        .expect("Failed to connect in-memory library")
}

/// Insert a student with sensible defaults, returning the surrogate id.
pub async fn seed_student(library: &Library, student_id: &str, name: &str) -> i64 {
    library
        .catalog()
        .create_student(CreateStudent {
            student_id: student_id.to_string(),
            name: name.to_string(),
            email: format!("{}@example.edu", student_id.to_lowercase()),
            phone: None,
            course: Some("Literature".to_string()),
            year: None,
        })
        .await
        .expect("Failed to create student")
}

/// Insert a book with the given number of copies, returning the surrogate id.
pub async fn seed_book(library: &Library, isbn: &str, title: &str, copies: i64) -> i64 {
    library
        .catalog()
        .create_book(CreateBook {
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: "Test Author".to_string(),
            category: None,
            publisher: None,
            total_copies: Some(copies),
        })
        .await
        .expect("Failed to create book")
}

/// Backdate a transaction's due date so a return today is `days_ago` late.
pub async fn backdate_due_date(library: &Library, transaction_id: i64, days_ago: i64) {
    let due = Utc::now().date_naive() - Duration::days(days_ago);
    let issued = due - Duration::days(14);
    sqlx::query("UPDATE transactions SET due_date = ?2, issue_date = ?3 WHERE id = ?1")
        .bind(transaction_id)
        .bind(due)
        .bind(issued)
        .execute(&library.pool)
        .await
        .expect("Failed to backdate transaction");
}
