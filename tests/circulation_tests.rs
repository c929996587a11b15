//! Circulation integration tests: issue, return, fines, and the
//! availability ledger

mod common;

use chrono::{Duration, Utc};
use libris::models::{IssueRequest, TransactionFilter, TransactionStatus, UpdateBook};
use libris::AppError;

fn issue_request(student_id: &str, book_id: i64) -> IssueRequest {
    IssueRequest {
        student_id: student_id.to_string(),
        book_id,
        due_days: None,
    }
}

#[tokio::test]
async fn issue_opens_loan_and_takes_copy_off_shelf() {
    let library = common::test_library().await;
    common::seed_student(&library, "S-100", "Asha Rao").await;
    let book_id = common::seed_book(&library, "978-1", "The Dispossessed", 2).await;

    let today = Utc::now().date_naive();
    let transaction = library
        .circulation()
        .issue(IssueRequest {
            student_id: "S-100".to_string(),
            book_id,
            due_days: Some(7),
        })
        .await
        .unwrap();

    assert_eq!(transaction.student_id, "S-100");
    assert_eq!(transaction.book_id, book_id);
    assert_eq!(transaction.status, TransactionStatus::Issued);
    assert_eq!(transaction.issue_date, today);
    assert_eq!(transaction.due_date, today + Duration::days(7));
    assert_eq!(transaction.fine_amount, 0);
    assert!(transaction.return_date.is_none());

    let book = library.catalog().get_book(book_id).await.unwrap();
    assert_eq!(book.available_copies, 1);
    assert_eq!(book.total_copies, 2);
}

#[tokio::test]
async fn issue_uses_configured_default_loan_period() {
    let library = common::test_library().await;
    common::seed_student(&library, "S-100", "Asha Rao").await;
    let book_id = common::seed_book(&library, "978-1", "Default Period", 1).await;

    let transaction = library
        .circulation()
        .issue(issue_request("S-100", book_id))
        .await
        .unwrap();

    let expected = transaction.issue_date + Duration::days(14);
    assert_eq!(transaction.due_date, expected);
}

#[tokio::test]
async fn issue_unknown_student_or_book_is_not_found() {
    let library = common::test_library().await;
    common::seed_student(&library, "S-100", "Asha Rao").await;
    let book_id = common::seed_book(&library, "978-1", "Exists", 1).await;

    let no_student = library
        .circulation()
        .issue(issue_request("S-999", book_id))
        .await
        .unwrap_err();
    assert!(matches!(no_student, AppError::NotFound(_)));

    let no_book = library
        .circulation()
        .issue(issue_request("S-100", 9999))
        .await
        .unwrap_err();
    assert!(matches!(no_book, AppError::NotFound(_)));

    // Neither failure touched the shelf.
    let book = library.catalog().get_book(book_id).await.unwrap();
    assert_eq!(book.available_copies, 1);
}

#[tokio::test]
async fn issue_rejects_blank_student_and_bad_due_days() {
    let library = common::test_library().await;
    common::seed_student(&library, "S-100", "Asha Rao").await;
    let book_id = common::seed_book(&library, "978-1", "Strict", 1).await;

    let blank = library
        .circulation()
        .issue(issue_request("   ", book_id))
        .await
        .unwrap_err();
    assert!(matches!(blank, AppError::Validation(_)));

    let zero_days = library
        .circulation()
        .issue(IssueRequest {
            student_id: "S-100".to_string(),
            book_id,
            due_days: Some(0),
        })
        .await
        .unwrap_err();
    assert!(matches!(zero_days, AppError::Validation(_)));

    let negative_days = library
        .circulation()
        .issue(IssueRequest {
            student_id: "S-100".to_string(),
            book_id,
            due_days: Some(-3),
        })
        .await
        .unwrap_err();
    assert!(matches!(negative_days, AppError::Validation(_)));

    // Periods past the ceiling are rejected, not stamped onto a due date
    // the calendar arithmetic cannot hold.
    let excessive_days = library
        .circulation()
        .issue(IssueRequest {
            student_id: "S-100".to_string(),
            book_id,
            due_days: Some(100_000_000),
        })
        .await
        .unwrap_err();
    assert!(matches!(excessive_days, AppError::Validation(_)));

    let maximal_days = library
        .circulation()
        .issue(IssueRequest {
            student_id: "S-100".to_string(),
            book_id,
            due_days: Some(i64::MAX),
        })
        .await
        .unwrap_err();
    assert!(matches!(maximal_days, AppError::Validation(_)));

    let open = library
        .circulation()
        .list(TransactionFilter::default())
        .await
        .unwrap();
    assert!(open.is_empty());
}

#[tokio::test]
async fn issue_accepts_loan_period_at_policy_ceiling() {
    let library = common::test_library().await;
    common::seed_student(&library, "S-100", "Asha Rao").await;
    let book_id = common::seed_book(&library, "978-1", "Long Loan", 1).await;

    let transaction = library
        .circulation()
        .issue(IssueRequest {
            student_id: "S-100".to_string(),
            book_id,
            due_days: Some(3650),
        })
        .await
        .unwrap();

    assert_eq!(
        transaction.due_date,
        transaction.issue_date + Duration::days(3650)
    );
}

#[tokio::test]
async fn issue_fails_once_no_copies_remain() {
    let library = common::test_library().await;
    common::seed_student(&library, "S-100", "Asha Rao").await;
    common::seed_student(&library, "S-200", "Ben Okri").await;
    let book_id = common::seed_book(&library, "978-1", "Single Copy", 1).await;

    library
        .circulation()
        .issue(issue_request("S-100", book_id))
        .await
        .unwrap();

    let err = library
        .circulation()
        .issue(issue_request("S-200", book_id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unavailable(_)), "got {:?}", err);

    // The failed issue left no trace: one open loan, zero availability.
    let book = library.catalog().get_book(book_id).await.unwrap();
    assert_eq!(book.available_copies, 0);

    let open = library
        .circulation()
        .list(TransactionFilter {
            status: Some(TransactionStatus::Issued),
            student_id: None,
        })
        .await
        .unwrap();
    assert_eq!(open.len(), 1);
}

#[tokio::test]
async fn concurrent_issues_of_last_copy_have_one_winner() {
    let library = common::test_library().await;
    common::seed_student(&library, "S-100", "Asha Rao").await;
    common::seed_student(&library, "S-200", "Ben Okri").await;
    let book_id = common::seed_book(&library, "978-1", "Contested", 1).await;

    let (a, b) = tokio::join!(
        library.circulation().issue(issue_request("S-100", book_id)),
        library.circulation().issue(issue_request("S-200", book_id)),
    );

    let outcomes = [a, b];
    let winners = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one issue may win the last copy");
    assert!(outcomes
        .iter()
        .any(|r| matches!(r, Err(AppError::Unavailable(_)))));

    let book = library.catalog().get_book(book_id).await.unwrap();
    assert_eq!(book.available_copies, 0);

    let open = library
        .circulation()
        .list(TransactionFilter {
            status: Some(TransactionStatus::Issued),
            student_id: None,
        })
        .await
        .unwrap();
    assert_eq!(open.len(), 1);
}

#[tokio::test]
async fn return_on_time_closes_loan_without_fine() {
    let library = common::test_library().await;
    common::seed_student(&library, "S-100", "Asha Rao").await;
    let book_id = common::seed_book(&library, "978-1", "Punctual", 1).await;

    let transaction = library
        .circulation()
        .issue(issue_request("S-100", book_id))
        .await
        .unwrap();

    let receipt = library
        .circulation()
        .return_loan(transaction.id)
        .await
        .unwrap();

    assert_eq!(receipt.transaction_id, transaction.id);
    assert_eq!(receipt.days_late, 0);
    assert_eq!(receipt.fine_amount, 0);
    assert_eq!(receipt.return_date, Utc::now().date_naive());

    let closed = library
        .circulation()
        .get_transaction(transaction.id)
        .await
        .unwrap();
    assert_eq!(closed.status, TransactionStatus::Returned);
    assert_eq!(closed.fine_amount, 0);
    assert_eq!(closed.return_date, Some(receipt.return_date));

    let book = library.catalog().get_book(book_id).await.unwrap();
    assert_eq!(book.available_copies, 1);
}

#[tokio::test]
async fn late_return_accrues_fine_per_day() {
    let library = common::test_library().await;
    common::seed_student(&library, "S-100", "Asha Rao").await;
    let book_id = common::seed_book(&library, "978-1", "Overdue", 1).await;

    let transaction = library
        .circulation()
        .issue(issue_request("S-100", book_id))
        .await
        .unwrap();
    common::backdate_due_date(&library, transaction.id, 3).await;

    let receipt = library
        .circulation()
        .return_loan(transaction.id)
        .await
        .unwrap();

    // Three days late at the default rate of 10 per day.
    assert_eq!(receipt.days_late, 3);
    assert_eq!(receipt.fine_amount, 30);

    let closed = library
        .circulation()
        .get_transaction(transaction.id)
        .await
        .unwrap();
    assert_eq!(closed.fine_amount, 30);
    assert_eq!(closed.status, TransactionStatus::Returned);
}

#[tokio::test]
async fn returning_twice_fails_and_restocks_only_once() {
    let library = common::test_library().await;
    common::seed_student(&library, "S-100", "Asha Rao").await;
    let book_id = common::seed_book(&library, "978-1", "Once Only", 2).await;

    let transaction = library
        .circulation()
        .issue(issue_request("S-100", book_id))
        .await
        .unwrap();

    library
        .circulation()
        .return_loan(transaction.id)
        .await
        .unwrap();

    let err = library
        .circulation()
        .return_loan(transaction.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {:?}", err);

    let book = library.catalog().get_book(book_id).await.unwrap();
    assert_eq!(book.available_copies, 2);
}

#[tokio::test]
async fn return_of_unknown_transaction_is_not_found() {
    let library = common::test_library().await;

    let err = library.circulation().return_loan(321).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn return_after_inventory_shrink_is_absorbed_at_ceiling() {
    let library = common::test_library().await;
    common::seed_student(&library, "S-100", "Asha Rao").await;
    common::seed_student(&library, "S-200", "Ben Okri").await;
    let book_id = common::seed_book(&library, "978-1", "Shrunk", 2).await;

    let first = library
        .circulation()
        .issue(issue_request("S-100", book_id))
        .await
        .unwrap();
    let second = library
        .circulation()
        .issue(issue_request("S-200", book_id))
        .await
        .unwrap();

    // Both copies out; the operator shrinks the inventory to one.
    library
        .catalog()
        .update_book(
            book_id,
            UpdateBook {
                isbn: "978-1".to_string(),
                title: "Shrunk".to_string(),
                author: "Test Author".to_string(),
                category: None,
                publisher: None,
                total_copies: Some(1),
            },
        )
        .await
        .unwrap();

    library.circulation().return_loan(first.id).await.unwrap();
    library.circulation().return_loan(second.id).await.unwrap();

    // Two returns against a one-copy inventory: availability stays capped.
    let book = library.catalog().get_book(book_id).await.unwrap();
    assert_eq!(book.total_copies, 1);
    assert_eq!(book.available_copies, 1);
}

#[tokio::test]
async fn list_enriches_and_filters_transactions() {
    let library = common::test_library().await;
    common::seed_student(&library, "S-100", "Asha Rao").await;
    common::seed_student(&library, "S-200", "Ben Okri").await;
    let first_book = common::seed_book(&library, "978-1", "First Book", 2).await;
    let second_book = common::seed_book(&library, "978-2", "Second Book", 2).await;

    let loan_a = library
        .circulation()
        .issue(issue_request("S-100", first_book))
        .await
        .unwrap();
    library
        .circulation()
        .issue(issue_request("S-100", second_book))
        .await
        .unwrap();
    library
        .circulation()
        .issue(issue_request("S-200", first_book))
        .await
        .unwrap();

    library.circulation().return_loan(loan_a.id).await.unwrap();

    let all = library
        .circulation()
        .list(TransactionFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    // Newest first; display fields joined in.
    assert_eq!(all[0].student_name, "Ben Okri");
    assert_eq!(all[0].book_title, "First Book");
    assert_eq!(all[0].isbn, "978-1");

    let issued_only = library
        .circulation()
        .list(TransactionFilter {
            status: Some(TransactionStatus::Issued),
            student_id: None,
        })
        .await
        .unwrap();
    assert_eq!(issued_only.len(), 2);
    assert!(issued_only
        .iter()
        .all(|t| t.status == TransactionStatus::Issued));

    let for_student = library
        .circulation()
        .list(TransactionFilter {
            status: None,
            student_id: Some("S-100".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(for_student.len(), 2);

    let open_for_student = library
        .circulation()
        .list(TransactionFilter {
            status: Some(TransactionStatus::Issued),
            student_id: Some("S-100".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(open_for_student.len(), 1);
    assert_eq!(open_for_student[0].book_title, "Second Book");
}

#[tokio::test]
async fn full_borrowing_scenario_keeps_ledger_consistent() {
    let library = common::test_library().await;
    common::seed_student(&library, "S-100", "Asha Rao").await;
    common::seed_student(&library, "S-200", "Ben Okri").await;
    let book_id = common::seed_book(&library, "978-1", "Two Copies", 2).await;

    let first = library
        .circulation()
        .issue(IssueRequest {
            student_id: "S-100".to_string(),
            book_id,
            due_days: Some(7),
        })
        .await
        .unwrap();
    assert_eq!(
        library
            .catalog()
            .get_book(book_id)
            .await
            .unwrap()
            .available_copies,
        1
    );

    library
        .circulation()
        .issue(issue_request("S-200", book_id))
        .await
        .unwrap();
    assert_eq!(
        library
            .catalog()
            .get_book(book_id)
            .await
            .unwrap()
            .available_copies,
        0
    );

    let third = library
        .circulation()
        .issue(issue_request("S-100", book_id))
        .await
        .unwrap_err();
    assert!(matches!(third, AppError::Unavailable(_)));

    let receipt = library.circulation().return_loan(first.id).await.unwrap();
    assert_eq!(receipt.fine_amount, 0);
    assert_eq!(
        library
            .catalog()
            .get_book(book_id)
            .await
            .unwrap()
            .available_copies,
        1
    );

    let closed = library
        .circulation()
        .get_transaction(first.id)
        .await
        .unwrap();
    assert_eq!(closed.status, TransactionStatus::Returned);
}
