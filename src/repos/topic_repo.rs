//! topics table CRUD
//!
//! Topics are the authoritative owner of the course relationship;
//! reassigning a course is a single-row update here.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use super::{new_id, now_rfc3339, parse_json_column, parse_timestamp};
use crate::error::{ApiError, ApiResult};
use crate::models::{Topic, TopicResource};

pub struct NewTopic {
    pub title: String,
    pub week: i64,
    pub summary: String,
    pub key_points: Vec<String>,
    pub resources: Vec<TopicResource>,
    pub course_id: String,
}

pub struct TopicRepo;

impl TopicRepo {
    pub fn create(conn: &Connection, new: &NewTopic) -> ApiResult<Topic> {
        let id = new_id("top");
        let now = now_rfc3339();

        conn.execute(
            r#"
            INSERT INTO topics (
                id, title, week, summary, key_points, resources, course_id,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                id,
                new.title,
                new.week,
                new.summary,
                serde_json::to_string(&new.key_points)?,
                serde_json::to_string(&new.resources)?,
                new.course_id,
                now,
                now,
            ],
        )?;

        info!("[TopicRepo] Created topic id={}", id);
        Self::get(conn, &id)?.ok_or_else(|| ApiError::database("insert lost"))
    }

    pub fn get(conn: &Connection, id: &str) -> ApiResult<Option<Topic>> {
        let topic = conn
            .query_row(
                "SELECT id, title, week, summary, key_points, resources, course_id,
                        created_at, updated_at
                 FROM topics WHERE id = ?1",
                params![id],
                Self::row_to_topic,
            )
            .optional()?;
        Ok(topic)
    }

    pub fn list(conn: &Connection) -> ApiResult<Vec<Topic>> {
        let mut stmt = conn.prepare(
            "SELECT id, title, week, summary, key_points, resources, course_id,
                    created_at, updated_at
             FROM topics ORDER BY week, created_at",
        )?;
        let topics = stmt
            .query_map([], Self::row_to_topic)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(topics)
    }

    pub fn exists(conn: &Connection, id: &str) -> ApiResult<bool> {
        let found: Option<i64> = conn
            .query_row("SELECT 1 FROM topics WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    pub fn find_by_title(conn: &Connection, title: &str) -> ApiResult<Option<String>> {
        let id: Option<String> = conn
            .query_row(
                "SELECT id FROM topics WHERE title = ?1",
                params![title],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Topic ids of a course, ordered by week. This is the computed side
    /// of the Course <-> Topic relationship.
    pub fn ids_for_course(conn: &Connection, course_id: &str) -> ApiResult<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT id FROM topics WHERE course_id = ?1 ORDER BY week, created_at",
        )?;
        let ids = stmt
            .query_map(params![course_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    pub fn count_for_course(conn: &Connection, course_id: &str) -> ApiResult<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM topics WHERE course_id = ?1",
            params![course_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Partial update; `None` fields keep their value.
    pub fn update(
        conn: &Connection,
        id: &str,
        title: Option<&str>,
        week: Option<i64>,
        summary: Option<&str>,
        key_points: Option<&[String]>,
        resources: Option<&[TopicResource]>,
        course_id: Option<&str>,
    ) -> ApiResult<Option<Topic>> {
        let key_points_json = key_points.map(serde_json::to_string).transpose()?;
        let resources_json = resources.map(serde_json::to_string).transpose()?;

        let changed = conn.execute(
            "UPDATE topics SET
                title = COALESCE(?2, title),
                week = COALESCE(?3, week),
                summary = COALESCE(?4, summary),
                key_points = COALESCE(?5, key_points),
                resources = COALESCE(?6, resources),
                course_id = COALESCE(?7, course_id),
                updated_at = ?8
             WHERE id = ?1",
            params![
                id,
                title,
                week,
                summary,
                key_points_json,
                resources_json,
                course_id,
                now_rfc3339(),
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get(conn, id)
    }

    pub fn delete(conn: &Connection, id: &str) -> ApiResult<bool> {
        let changed = conn.execute("DELETE FROM topics WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn row_to_topic(row: &Row<'_>) -> rusqlite::Result<Topic> {
        let key_points_raw: String = row.get(4)?;
        let resources_raw: String = row.get(5)?;
        Ok(Topic {
            id: row.get(0)?,
            title: row.get(1)?,
            week: row.get(2)?,
            summary: row.get(3)?,
            key_points: parse_json_column(4, &key_points_raw)?,
            resources: parse_json_column(5, &resources_raw)?,
            course_id: row.get(6)?,
            created_at: parse_timestamp(7, row.get(7)?)?,
            updated_at: parse_timestamp(8, row.get(8)?)?,
        })
    }
}
