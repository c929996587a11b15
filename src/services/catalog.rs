//! Catalog management service: students and books

use tracing::info;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, CreateBook, UpdateBook},
        student::{CreateStudent, Student, UpdateStudent},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // ------------------------------------------------------------------
    // Students
    // ------------------------------------------------------------------

    /// Register a new student; the business key must be unused.
    pub async fn create_student(&self, mut student: CreateStudent) -> AppResult<i64> {
        student.student_id = student.student_id.trim().to_string();
        student.validate()?;

        if self
            .repository
            .students
            .student_id_exists(&student.student_id)
            .await?
        {
            return Err(AppError::duplicate("student_id", &student.student_id));
        }

        let id = self.repository.students.create(&student).await?;
        info!(id, student_id = %student.student_id, "student created");
        Ok(id)
    }

    /// Get student by surrogate id
    pub async fn get_student(&self, id: i64) -> AppResult<Student> {
        self.repository.students.get_by_id(id).await
    }

    /// Get student by business key
    pub async fn get_student_by_student_id(&self, student_id: &str) -> AppResult<Student> {
        self.repository.students.get_by_student_id(student_id).await
    }

    /// Update a student's details; the business key cannot change.
    pub async fn update_student(&self, id: i64, student: UpdateStudent) -> AppResult<Student> {
        student.validate()?;
        self.repository.students.update(id, &student).await
    }

    /// Delete a student, refusing while books are still out
    pub async fn delete_student(&self, id: i64) -> AppResult<()> {
        self.repository.students.delete(id).await?;
        info!(id, "student deleted");
        Ok(())
    }

    /// Search students, or list all when no term is given
    pub async fn find_students(&self, term: Option<&str>) -> AppResult<Vec<Student>> {
        self.repository.students.search(term).await
    }

    // ------------------------------------------------------------------
    // Books
    // ------------------------------------------------------------------

    /// Add a book to the catalog; every copy starts on the shelf.
    pub async fn create_book(&self, mut book: CreateBook) -> AppResult<i64> {
        book.isbn = book.isbn.trim().to_string();
        book.validate()?;

        if self.repository.books.isbn_exists(&book.isbn, None).await? {
            return Err(AppError::duplicate("isbn", &book.isbn));
        }

        let id = self.repository.books.create(&book).await?;
        info!(id, isbn = %book.isbn, "book created");
        Ok(id)
    }

    /// Get book by id
    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Get book by ISBN
    pub async fn get_book_by_isbn(&self, isbn: &str) -> AppResult<Book> {
        self.repository.books.get_by_isbn(isbn).await
    }

    /// Update a book.
    ///
    /// A supplied `total_copies` resizes the inventory and recomputes the
    /// shelf count around the copies currently out; `None` leaves both
    /// counters alone.
    pub async fn update_book(&self, id: i64, mut book: UpdateBook) -> AppResult<Book> {
        book.isbn = book.isbn.trim().to_string();
        book.validate()?;

        // Existence first, so a missing book reads as NotFound rather than
        // falling through the uniqueness probe.
        self.repository.books.get_by_id(id).await?;

        if self
            .repository
            .books
            .isbn_exists(&book.isbn, Some(id))
            .await?
        {
            return Err(AppError::duplicate("isbn", &book.isbn));
        }

        self.repository.books.update(id, &book).await
    }

    /// Delete a book, refusing while copies are out on loan
    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        info!(id, "book deleted");
        Ok(())
    }

    /// Search the catalog, or list all books when no term is given
    pub async fn find_books(&self, term: Option<&str>) -> AppResult<Vec<Book>> {
        self.repository.books.search(term).await
    }
}
