//! Data models for the libris core

pub mod book;
pub mod report;
pub mod student;
pub mod transaction;

// Re-export commonly used types
pub use book::{Book, CreateBook, UpdateBook};
pub use report::{BookUsage, Overview, StudentUsage};
pub use student::{CreateStudent, Student, UpdateStudent};
pub use transaction::{
    IssueRequest, ReturnReceipt, Transaction, TransactionDetails, TransactionFilter,
    TransactionStatus,
};
