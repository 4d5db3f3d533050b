/// Database module for student profiles and completed coursework

mod types;

pub use types::{DbError, SaveSummary, Student};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::requirements::{normalize_and_dedupe, CourseCode};

const SCHEMA_SQL: &str = include_str!("../../sql/init_students.sql");

pub struct StudentDb {
    db: Mutex<Connection>,
}

impl StudentDb {
    /// Opens (or creates) the database at `db_path` and initializes the schema
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, DbError> {
        let conn = Connection::open(db_path.as_ref())?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, DbError> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DbError> {
        self.db.lock().map_err(|_| DbError::LockPoisoned)
    }

    /// Creates the student or updates their college
    pub fn upsert_student(&self, student_id: &str, college: &str) -> Result<Student, DbError> {
        let db = self.lock()?;
        let now = Utc::now();

        db.execute(
            "INSERT INTO students (student_id, college, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(student_id) DO UPDATE SET college = excluded.college,
                                                   updated_at = excluded.updated_at",
            (student_id, college, now),
        )?;

        info!(student_id = %student_id, college = %college, "Student profile saved");
        Ok(Student {
            student_id: student_id.to_string(),
            college: college.to_string(),
            updated_at: now,
        })
    }

    pub fn get_student(&self, student_id: &str) -> Result<Option<Student>, DbError> {
        let db = self.lock()?;
        let student = db
            .query_row(
                "SELECT student_id, college, updated_at FROM students WHERE student_id = ?",
                [student_id],
                |row| {
                    Ok(Student {
                        student_id: row.get(0)?,
                        college: row.get(1)?,
                        updated_at: row.get::<_, DateTime<Utc>>(2)?,
                    })
                },
            )
            .optional()?;

        Ok(student)
    }

    /// Normalizes and dedupes `raws`, then stores the codes the student does
    /// not have yet. All inserts happen in one transaction.
    pub fn save_completed_courses<S: AsRef<str>>(
        &self,
        student_id: &str,
        raws: &[S],
    ) -> Result<SaveSummary, DbError> {
        let codes = normalize_and_dedupe(raws);

        let mut db = self.lock()?;
        ensure_student(&db, student_id)?;

        let tx = db.transaction()?;
        let now = Utc::now();
        let mut saved_count = 0;
        let mut skipped = Vec::new();

        for code in &codes {
            let inserted = tx.execute(
                "INSERT OR IGNORE INTO completed_courses (student_id, course_code, saved_at)
                 VALUES (?1, ?2, ?3)",
                (student_id, code.as_str(), now),
            )?;

            if inserted == 0 {
                skipped.push(code.to_string());
            } else {
                saved_count += 1;
            }
        }
        tx.commit()?;

        debug!(
            student_id = %student_id,
            saved = saved_count,
            skipped = skipped.len(),
            "Completed courses saved"
        );
        Ok(SaveSummary {
            saved_count,
            total_courses: codes.len(),
            skipped,
        })
    }

    /// Completed courses in the order they were first saved
    pub fn completed_courses(&self, student_id: &str) -> Result<Vec<CourseCode>, DbError> {
        let db = self.lock()?;
        ensure_student(&db, student_id)?;

        let mut stmt = db.prepare(
            "SELECT course_code FROM completed_courses WHERE student_id = ? ORDER BY id",
        )?;
        let codes = stmt
            .query_map([student_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(codes.into_iter().map(CourseCode::from_canonical).collect())
    }
}

fn ensure_student(db: &Connection, student_id: &str) -> Result<(), DbError> {
    let exists: bool = db.query_row(
        "SELECT EXISTS(SELECT 1 FROM students WHERE student_id = ?)",
        [student_id],
        |row| row.get(0),
    )?;

    if exists {
        Ok(())
    } else {
        Err(DbError::StudentNotFound {
            student_id: student_id.to_string(),
        })
    }
}
