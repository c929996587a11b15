//! Students repository for database operations

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    error::{AppError, AppResult},
    models::student::{CreateStudent, Student, UpdateStudent},
};

#[derive(Clone)]
pub struct StudentsRepository {
    pool: SqlitePool,
}

impl StudentsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get student by surrogate id
    pub async fn get_by_id(&self, id: i64) -> AppResult<Student> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("student", id))
    }

    /// Get student by business key
    pub async fn get_by_student_id(&self, student_id: &str) -> AppResult<Student> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE student_id = ?1")
            .bind(student_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("student", student_id))
    }

    /// Check if a student business key is already taken
    pub async fn student_id_exists(&self, student_id: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE student_id = ?1)")
                .bind(student_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a new student, returning the surrogate id
    pub async fn create(&self, student: &CreateStudent) -> AppResult<i64> {
        let now = Utc::now();

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO students (student_id, name, email, phone, course, year, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING id
            "#,
        )
        .bind(&student.student_id)
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(&student.course)
        .bind(&student.year)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Update an existing student; the business key stays as created.
    pub async fn update(&self, id: i64, student: &UpdateStudent) -> AppResult<Student> {
        let result = sqlx::query(
            r#"
            UPDATE students
            SET name = ?2, email = ?3, phone = ?4, course = ?5, year = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(&student.course)
        .bind(&student.year)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("student", id));
        }

        self.get_by_id(id).await
    }

    /// Delete a student.
    ///
    /// Refused while the student still has books out; closed loan history is
    /// removed along with the record. The open-loan check and the delete run
    /// in one database transaction so an issue racing in between cannot
    /// leave orphaned open loans.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let student_id: Option<String> =
            sqlx::query_scalar("SELECT student_id FROM students WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(student_id) = student_id else {
            return Err(AppError::not_found("student", id));
        };

        let open_loans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM transactions WHERE student_id = ?1 AND status = 'issued'",
        )
        .bind(&student_id)
        .fetch_one(&mut *tx)
        .await?;

        if open_loans > 0 {
            return Err(AppError::Conflict(format!(
                "student {} has {} book(s) not yet returned",
                student_id, open_loans
            )));
        }

        sqlx::query("DELETE FROM students WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Search students by name, business key, or email; newest first.
    ///
    /// A blank term lists everyone.
    pub async fn search(&self, term: Option<&str>) -> AppResult<Vec<Student>> {
        match term.map(str::trim) {
            Some(term) if !term.is_empty() => {
                let pattern = format!("%{}%", term.to_lowercase());
                let students = sqlx::query_as::<_, Student>(
                    r#"
                    SELECT * FROM students
                    WHERE LOWER(name) LIKE ?1
                       OR LOWER(student_id) LIKE ?1
                       OR LOWER(email) LIKE ?1
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?;
                Ok(students)
            }
            _ => {
                let students = sqlx::query_as::<_, Student>(
                    "SELECT * FROM students ORDER BY created_at DESC, id DESC",
                )
                .fetch_all(&self.pool)
                .await?;
                Ok(students)
            }
        }
    }
}
