/// Database types for student records
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Student {
    pub student_id: String,
    pub college: String,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of saving a batch of completed courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveSummary {
    /// Codes newly stored by this call
    pub saved_count: usize,
    /// Distinct valid codes in the request
    pub total_courses: usize,
    /// Codes the student already had
    pub skipped: Vec<String>,
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Student {student_id} not found")]
    StudentNotFound { student_id: String },

    #[error("Database lock poisoned")]
    LockPoisoned,
}

impl DbError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::StudentNotFound { .. })
    }
}
