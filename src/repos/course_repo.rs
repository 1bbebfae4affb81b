//! courses table CRUD
//!
//! The `topics` field of [`Course`] is never stored: it is populated from
//! `topics.course_id` on every read, so the back-reference can not drift.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use super::{new_id, now_rfc3339, parse_json_column, parse_timestamp, TopicRepo};
use crate::error::{ApiError, ApiResult};
use crate::models::Course;

pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub teacher: String,
    pub scope: String,
    pub semester: String,
    pub learning_objectives: Vec<String>,
    pub skills: Vec<String>,
    pub competencies: Vec<String>,
}

pub struct CourseRepo;

impl CourseRepo {
    pub fn create(conn: &Connection, new: &NewCourse) -> ApiResult<Course> {
        let id = new_id("crs");
        let now = now_rfc3339();

        conn.execute(
            r#"
            INSERT INTO courses (
                id, title, description, teacher, scope, semester,
                learning_objectives, skills, competencies, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                id,
                new.title,
                new.description,
                new.teacher,
                new.scope,
                new.semester,
                serde_json::to_string(&new.learning_objectives)?,
                serde_json::to_string(&new.skills)?,
                serde_json::to_string(&new.competencies)?,
                now,
                now,
            ],
        )?;

        info!("[CourseRepo] Created course id={}", id);
        Self::get(conn, &id)?.ok_or_else(|| ApiError::database("insert lost"))
    }

    pub fn get(conn: &Connection, id: &str) -> ApiResult<Option<Course>> {
        let course = conn
            .query_row(
                "SELECT id, title, description, teacher, scope, semester,
                        learning_objectives, skills, competencies, created_at, updated_at
                 FROM courses WHERE id = ?1",
                params![id],
                Self::row_to_course,
            )
            .optional()?;

        match course {
            Some(mut c) => {
                c.topics = TopicRepo::ids_for_course(conn, &c.id)?;
                Ok(Some(c))
            }
            None => Ok(None),
        }
    }

    pub fn list(conn: &Connection) -> ApiResult<Vec<Course>> {
        let mut stmt = conn.prepare(
            "SELECT id, title, description, teacher, scope, semester,
                    learning_objectives, skills, competencies, created_at, updated_at
             FROM courses ORDER BY created_at",
        )?;
        let mut courses = stmt
            .query_map([], Self::row_to_course)?
            .collect::<Result<Vec<_>, _>>()?;
        for course in &mut courses {
            course.topics = TopicRepo::ids_for_course(conn, &course.id)?;
        }
        Ok(courses)
    }

    pub fn exists(conn: &Connection, id: &str) -> ApiResult<bool> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM courses WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn find_by_title(conn: &Connection, title: &str) -> ApiResult<Option<String>> {
        let id: Option<String> = conn
            .query_row(
                "SELECT id FROM courses WHERE title = ?1",
                params![title],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Partial update; `None` fields are left untouched.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        conn: &Connection,
        id: &str,
        title: Option<&str>,
        description: Option<&str>,
        teacher: Option<&str>,
        scope: Option<&str>,
        semester: Option<&str>,
        learning_objectives: Option<&[String]>,
        skills: Option<&[String]>,
        competencies: Option<&[String]>,
    ) -> ApiResult<Option<Course>> {
        let objectives_json = learning_objectives
            .map(serde_json::to_string)
            .transpose()?;
        let skills_json = skills.map(serde_json::to_string).transpose()?;
        let competencies_json = competencies.map(serde_json::to_string).transpose()?;

        let changed = conn.execute(
            "UPDATE courses SET
                title = COALESCE(?2, title),
                description = COALESCE(?3, description),
                teacher = COALESCE(?4, teacher),
                scope = COALESCE(?5, scope),
                semester = COALESCE(?6, semester),
                learning_objectives = COALESCE(?7, learning_objectives),
                skills = COALESCE(?8, skills),
                competencies = COALESCE(?9, competencies),
                updated_at = ?10
             WHERE id = ?1",
            params![
                id,
                title,
                description,
                teacher,
                scope,
                semester,
                objectives_json,
                skills_json,
                competencies_json,
                now_rfc3339(),
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get(conn, id)
    }

    pub fn delete(conn: &Connection, id: &str) -> ApiResult<bool> {
        let changed = conn.execute("DELETE FROM courses WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn row_to_course(row: &Row<'_>) -> rusqlite::Result<Course> {
        let objectives_raw: String = row.get(6)?;
        let skills_raw: String = row.get(7)?;
        let competencies_raw: String = row.get(8)?;
        Ok(Course {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            teacher: row.get(3)?,
            scope: row.get(4)?,
            semester: row.get(5)?,
            learning_objectives: parse_json_column(6, &objectives_raw)?,
            skills: parse_json_column(7, &skills_raw)?,
            competencies: parse_json_column(8, &competencies_raw)?,
            topics: Vec::new(),
            created_at: parse_timestamp(9, row.get(9)?)?,
            updated_at: parse_timestamp(10, row.get(10)?)?,
        })
    }
}
