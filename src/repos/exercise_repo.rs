//! exercises table CRUD (one exercise per topic)

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use super::{new_id, now_rfc3339, parse_json_column, parse_timestamp};
use crate::error::{ApiError, ApiResult};
use crate::models::{Difficulty, Exercise, ExerciseQuestion};

pub struct NewExercise {
    pub topic_id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub hints: Vec<String>,
    pub solutions: Vec<String>,
    pub questions: Vec<ExerciseQuestion>,
}

pub struct ExerciseRepo;

impl ExerciseRepo {
    pub fn create(conn: &Connection, new: &NewExercise) -> ApiResult<Exercise> {
        let id = new_id("ex");
        let now = now_rfc3339();

        conn.execute(
            r#"
            INSERT INTO exercises (
                id, topic_id, title, description, difficulty, hints, solutions,
                questions, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                id,
                new.topic_id,
                new.title,
                new.description,
                new.difficulty.as_str(),
                serde_json::to_string(&new.hints)?,
                serde_json::to_string(&new.solutions)?,
                serde_json::to_string(&new.questions)?,
                now,
                now,
            ],
        )?;

        info!("[ExerciseRepo] Created exercise id={}", id);
        Self::get(conn, &id)?.ok_or_else(|| ApiError::database("insert lost"))
    }

    pub fn get(conn: &Connection, id: &str) -> ApiResult<Option<Exercise>> {
        let exercise = conn
            .query_row(
                "SELECT id, topic_id, title, description, difficulty, hints, solutions,
                        questions, created_at, updated_at
                 FROM exercises WHERE id = ?1",
                params![id],
                Self::row_to_exercise,
            )
            .optional()?;
        Ok(exercise)
    }

    /// List all exercises, optionally scoped to one topic.
    pub fn list(conn: &Connection, topic_id: Option<&str>) -> ApiResult<Vec<Exercise>> {
        let mut stmt = conn.prepare(
            "SELECT id, topic_id, title, description, difficulty, hints, solutions,
                    questions, created_at, updated_at
             FROM exercises
             WHERE (?1 IS NULL OR topic_id = ?1)
             ORDER BY created_at",
        )?;
        let exercises = stmt
            .query_map(params![topic_id], Self::row_to_exercise)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(exercises)
    }

    pub fn exists_for_topic(conn: &Connection, topic_id: &str) -> ApiResult<bool> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM exercises WHERE topic_id = ?1",
                params![topic_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn update(
        conn: &Connection,
        id: &str,
        topic_id: Option<&str>,
        title: Option<&str>,
        description: Option<&str>,
        difficulty: Option<Difficulty>,
        hints: Option<&[String]>,
        solutions: Option<&[String]>,
        questions: Option<&[ExerciseQuestion]>,
    ) -> ApiResult<Option<Exercise>> {
        let hints_json = hints.map(serde_json::to_string).transpose()?;
        let solutions_json = solutions.map(serde_json::to_string).transpose()?;
        let questions_json = questions.map(serde_json::to_string).transpose()?;

        let changed = conn.execute(
            "UPDATE exercises SET
                topic_id = COALESCE(?2, topic_id),
                title = COALESCE(?3, title),
                description = COALESCE(?4, description),
                difficulty = COALESCE(?5, difficulty),
                hints = COALESCE(?6, hints),
                solutions = COALESCE(?7, solutions),
                questions = COALESCE(?8, questions),
                updated_at = ?9
             WHERE id = ?1",
            params![
                id,
                topic_id,
                title,
                description,
                difficulty.map(|d| d.as_str()),
                hints_json,
                solutions_json,
                questions_json,
                now_rfc3339(),
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get(conn, id)
    }

    pub fn delete(conn: &Connection, id: &str) -> ApiResult<bool> {
        let changed = conn.execute("DELETE FROM exercises WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn row_to_exercise(row: &Row<'_>) -> rusqlite::Result<Exercise> {
        let difficulty_raw: String = row.get(4)?;
        let difficulty = Difficulty::from_str(&difficulty_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Text,
                format!("unknown difficulty {:?}", difficulty_raw).into(),
            )
        })?;
        let hints_raw: String = row.get(5)?;
        let solutions_raw: String = row.get(6)?;
        let questions_raw: String = row.get(7)?;
        Ok(Exercise {
            id: row.get(0)?,
            topic_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            difficulty,
            hints: parse_json_column(5, &hints_raw)?,
            solutions: parse_json_column(6, &solutions_raw)?,
            questions: parse_json_column(7, &questions_raw)?,
            created_at: parse_timestamp(8, row.get(8)?)?,
            updated_at: parse_timestamp(9, row.get(9)?)?,
        })
    }
}
