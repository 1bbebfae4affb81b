//! quizzes table CRUD
//!
//! Options are stored as a JSON column and always handed back sorted
//! ascending by `order`.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use super::{new_id, now_rfc3339, parse_json_column, parse_timestamp};
use crate::error::{ApiError, ApiResult};
use crate::models::{Quiz, QuizOption};

pub struct QuizRepo;

impl QuizRepo {
    pub fn create(
        conn: &Connection,
        topic_id: &str,
        question: &str,
        options: &[QuizOption],
    ) -> ApiResult<Quiz> {
        let id = new_id("qz");
        let now = now_rfc3339();

        conn.execute(
            r#"
            INSERT INTO quizzes (id, topic_id, question, options, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                id,
                topic_id,
                question,
                serde_json::to_string(options)?,
                now,
                now,
            ],
        )?;

        info!("[QuizRepo] Created quiz id={}", id);
        Self::get(conn, &id)?.ok_or_else(|| ApiError::database("insert lost"))
    }

    pub fn get(conn: &Connection, id: &str) -> ApiResult<Option<Quiz>> {
        let quiz = conn
            .query_row(
                "SELECT id, topic_id, question, options, created_at, updated_at
                 FROM quizzes WHERE id = ?1",
                params![id],
                Self::row_to_quiz,
            )
            .optional()?;
        Ok(quiz)
    }

    pub fn list(conn: &Connection) -> ApiResult<Vec<Quiz>> {
        let mut stmt = conn.prepare(
            "SELECT id, topic_id, question, options, created_at, updated_at
             FROM quizzes ORDER BY created_at",
        )?;
        let quizzes = stmt
            .query_map([], Self::row_to_quiz)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(quizzes)
    }

    pub fn list_by_topic(conn: &Connection, topic_id: &str) -> ApiResult<Vec<Quiz>> {
        let mut stmt = conn.prepare(
            "SELECT id, topic_id, question, options, created_at, updated_at
             FROM quizzes WHERE topic_id = ?1 ORDER BY created_at",
        )?;
        let quizzes = stmt
            .query_map(params![topic_id], Self::row_to_quiz)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(quizzes)
    }

    pub fn find_by_question(conn: &Connection, question: &str) -> ApiResult<Option<String>> {
        let id: Option<String> = conn
            .query_row(
                "SELECT id FROM quizzes WHERE question = ?1",
                params![question],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    pub fn update(
        conn: &Connection,
        id: &str,
        topic_id: Option<&str>,
        question: Option<&str>,
        options: Option<&[QuizOption]>,
    ) -> ApiResult<Option<Quiz>> {
        let options_json = options.map(serde_json::to_string).transpose()?;

        let changed = conn.execute(
            "UPDATE quizzes SET
                topic_id = COALESCE(?2, topic_id),
                question = COALESCE(?3, question),
                options = COALESCE(?4, options),
                updated_at = ?5
             WHERE id = ?1",
            params![id, topic_id, question, options_json, now_rfc3339()],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get(conn, id)
    }

    pub fn delete(conn: &Connection, id: &str) -> ApiResult<bool> {
        let changed = conn.execute("DELETE FROM quizzes WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn row_to_quiz(row: &Row<'_>) -> rusqlite::Result<Quiz> {
        let options_raw: String = row.get(3)?;
        let mut options: Vec<QuizOption> = parse_json_column(3, &options_raw)?;
        options.sort_by_key(|o| o.order);
        Ok(Quiz {
            id: row.get(0)?,
            topic_id: row.get(1)?,
            question: row.get(2)?,
            options,
            created_at: parse_timestamp(4, row.get(4)?)?,
            updated_at: parse_timestamp(5, row.get(5)?)?,
        })
    }
}
