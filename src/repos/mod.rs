//! Per-aggregate CRUD over the SQLite pool
//!
//! Repos are stateless structs with associated functions taking a
//! `&Connection`; services own the pool and hand connections down so one
//! request never grabs the pool twice.

pub mod course_repo;
pub mod exercise_repo;
pub mod progress_repo;
pub mod quiz_repo;
pub mod topic_repo;
pub mod user_repo;

pub use course_repo::CourseRepo;
pub use exercise_repo::ExerciseRepo;
pub use progress_repo::ProgressRepo;
pub use quiz_repo::QuizRepo;
pub use topic_repo::TopicRepo;
pub use user_repo::{NewUser, UserRepo};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

/// Prefixed short id, e.g. `qz_V1StGXR8_Z`.
pub(crate) fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, nanoid::nanoid!(10))
}

pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Parse an rfc3339 TEXT column into a UTC timestamp.
pub(crate) fn parse_timestamp(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Decode a JSON-encoded TEXT column.
pub(crate) fn parse_json_column<T: DeserializeOwned>(idx: usize, raw: &str) -> rusqlite::Result<T> {
    serde_json::from_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
