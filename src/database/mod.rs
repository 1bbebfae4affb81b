//! SQLite storage layer
//!
//! - `manager`: r2d2 connection-pool wrapper
//! - schema bootstrap lives here so the table set is visible in one place

pub mod manager;

pub use manager::Database;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

pub type SqlitePool = Pool<SqliteConnectionManager>;
pub type SqlitePooledConnection = PooledConnection<SqliteConnectionManager>;

/// Create all tables and indexes. Idempotent.
///
/// Notes on referential design:
/// - `courses` stores no topic list; the back-reference is computed from
///   `topics.course_id` through `idx_topics_course`.
/// - quizzes/exercises cascade when their topic goes away.
/// - `progress_logs` carries no foreign keys at all: entries are
///   independent append-only facts that tolerate deleted aggregates.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'student' CHECK (role IN ('student', 'admin')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS courses (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL,
            teacher TEXT NOT NULL,
            scope TEXT NOT NULL DEFAULT '',
            semester TEXT NOT NULL DEFAULT '',
            learning_objectives TEXT NOT NULL DEFAULT '[]',
            skills TEXT NOT NULL DEFAULT '[]',
            competencies TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS topics (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL UNIQUE,
            week INTEGER NOT NULL,
            summary TEXT NOT NULL,
            key_points TEXT NOT NULL DEFAULT '[]',
            resources TEXT NOT NULL DEFAULT '[]',
            course_id TEXT NOT NULL REFERENCES courses(id),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_topics_course ON topics(course_id);

        CREATE TABLE IF NOT EXISTS quizzes (
            id TEXT PRIMARY KEY,
            topic_id TEXT NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
            question TEXT NOT NULL UNIQUE,
            options TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_quizzes_topic ON quizzes(topic_id);

        CREATE TABLE IF NOT EXISTS exercises (
            id TEXT PRIMARY KEY,
            topic_id TEXT NOT NULL UNIQUE REFERENCES topics(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            difficulty TEXT NOT NULL CHECK (difficulty IN ('easy', 'medium', 'hard')),
            hints TEXT NOT NULL DEFAULT '[]',
            solutions TEXT NOT NULL DEFAULT '[]',
            questions TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS progress_logs (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            course_id TEXT NOT NULL,
            topic_id TEXT NOT NULL,
            activity_type TEXT NOT NULL CHECK (
                activity_type IN ('topic', 'quiz', 'exercise', 'coding', 'debugging', 'cicd')
            ),
            activity_table TEXT NOT NULL,
            activity_id TEXT NOT NULL,
            is_correct INTEGER,
            completed_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_progress_user ON progress_logs(user_id);
        CREATE INDEX IF NOT EXISTS idx_progress_user_course
            ON progress_logs(user_id, course_id);
        "#,
    )
}
