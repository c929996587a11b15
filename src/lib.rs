//! Libris library circulation and catalog core
//!
//! The storage-backed heart of a small library management system: a catalog
//! of students and books, a circulation workflow that keeps each book's
//! availability counter consistent with its open loans, and read-only
//! reports. Everything is plain async Rust over SQLite; the transport that
//! fronts it (HTTP, desktop shell, CLI) is the embedder's business.
//!
//! ```no_run
//! use libris::{AppConfig, Library};
//! use libris::models::CreateStudent;
//!
//! # async fn demo() -> libris::AppResult<()> {
//! let library = Library::connect(AppConfig::in_memory()).await?;
//!
//! library.catalog().create_student(CreateStudent {
//!     student_id: "S-2024-001".into(),
//!     name: "Asha Rao".into(),
//!     email: "asha@example.edu".into(),
//!     phone: None,
//!     course: None,
//!     year: None,
//! }).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use sqlx::SqlitePool;

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Handle owning the connection pool and the service layer.
///
/// Cheap to clone; all clones share the same pool.
#[derive(Clone)]
pub struct Library {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    /// Exposed for advanced queries the services do not cover.
    pub pool: SqlitePool,
}

impl Library {
    /// Open the database (creating and migrating it as needed) and wire up
    /// the services.
    pub async fn connect(config: AppConfig) -> AppResult<Self> {
        let pool = db::connect(&config.database).await?;
        let repository = repository::Repository::new(pool.clone());
        let services = services::Services::new(repository, config.circulation.clone());

        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
            pool,
        })
    }

    /// Catalog operations: students and books
    pub fn catalog(&self) -> &services::catalog::CatalogService {
        &self.services.catalog
    }

    /// Circulation operations: issue, return, list
    pub fn circulation(&self) -> &services::circulation::CirculationService {
        &self.services.circulation
    }

    /// Read-only reports
    pub fn reports(&self) -> &services::reports::ReportsService {
        &self.services.reports
    }

    /// Close the connection pool; subsequent operations fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
