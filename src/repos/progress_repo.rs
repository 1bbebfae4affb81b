//! progress_logs table: append-only insert plus aggregation reads
//!
//! No foreign keys here on purpose: entries are independent facts and must
//! survive deletion of the aggregates they reference. Joined reads LEFT
//! JOIN the referenced tables so dangling references surface as nulls.

use rusqlite::{params, Connection, Row};
use tracing::info;

use super::{new_id, now_rfc3339, parse_timestamp};
use crate::error::{ApiError, ApiResult};
use crate::models::{ActivityRef, ActivityType, ProgressLog, ProgressView, RefView, UserRefView};

pub struct NewProgressLog {
    pub user_id: String,
    pub course_id: String,
    pub topic_id: String,
    pub activity: ActivityRef,
    pub is_correct: Option<bool>,
}

const VIEW_COLUMNS: &str = "
    p.id, p.user_id, u.username, p.course_id, c.title, p.topic_id, t.title,
    p.activity_type, p.activity_table, p.activity_id, q.question,
    p.is_correct, p.completed_at";

const VIEW_JOINS: &str = "
    FROM progress_logs p
    LEFT JOIN users u ON u.id = p.user_id
    LEFT JOIN courses c ON c.id = p.course_id
    LEFT JOIN topics t ON t.id = p.topic_id
    LEFT JOIN quizzes q ON q.id = p.activity_id AND p.activity_type = 'quiz'";

pub struct ProgressRepo;

impl ProgressRepo {
    /// Append one entry. The single write path for quiz and exercise
    /// attempts alike; rows are never updated or deleted afterwards.
    pub fn insert(conn: &Connection, new: &NewProgressLog) -> ApiResult<ProgressLog> {
        let id = new_id("plog");
        let completed_at = now_rfc3339();

        conn.execute(
            r#"
            INSERT INTO progress_logs (
                id, user_id, course_id, topic_id, activity_type, activity_table,
                activity_id, is_correct, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                id,
                new.user_id,
                new.course_id,
                new.topic_id,
                new.activity.kind.as_str(),
                new.activity.kind.table(),
                new.activity.id,
                new.is_correct,
                completed_at,
            ],
        )?;

        info!(
            "[ProgressRepo] Logged {} activity {} for user {}",
            new.activity.kind.as_str(),
            new.activity.id,
            new.user_id
        );
        Self::get(conn, &id)?.ok_or_else(|| ApiError::database("insert lost"))
    }

    pub fn get(conn: &Connection, id: &str) -> ApiResult<Option<ProgressLog>> {
        use rusqlite::OptionalExtension;
        let log = conn
            .query_row(
                "SELECT id, user_id, course_id, topic_id, activity_type, activity_id,
                        is_correct, completed_at
                 FROM progress_logs WHERE id = ?1",
                params![id],
                Self::row_to_log,
            )
            .optional()?;
        Ok(log)
    }

    pub fn list_all(conn: &Connection) -> ApiResult<Vec<ProgressView>> {
        let sql = format!(
            "SELECT {VIEW_COLUMNS} {VIEW_JOINS} ORDER BY p.completed_at"
        );
        let mut stmt = conn.prepare(&sql)?;
        let views = stmt
            .query_map([], Self::row_to_view)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(views)
    }

    pub fn list_for_user(conn: &Connection, user_id: &str) -> ApiResult<Vec<ProgressView>> {
        let sql = format!(
            "SELECT {VIEW_COLUMNS} {VIEW_JOINS} WHERE p.user_id = ?1 ORDER BY p.completed_at"
        );
        let mut stmt = conn.prepare(&sql)?;
        let views = stmt
            .query_map(params![user_id], Self::row_to_view)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(views)
    }

    /// All logs of one activity type for a user.
    pub fn attempts_for_user(
        conn: &Connection,
        user_id: &str,
        kind: ActivityType,
    ) -> ApiResult<Vec<ProgressView>> {
        let sql = format!(
            "SELECT {VIEW_COLUMNS} {VIEW_JOINS}
             WHERE p.user_id = ?1 AND p.activity_type = ?2
             ORDER BY p.completed_at"
        );
        let mut stmt = conn.prepare(&sql)?;
        let views = stmt
            .query_map(params![user_id, kind.as_str()], Self::row_to_view)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(views)
    }

    /// Same as [`Self::attempts_for_user`] scoped to one course.
    pub fn attempts_for_user_course(
        conn: &Connection,
        user_id: &str,
        course_id: &str,
        kind: ActivityType,
    ) -> ApiResult<Vec<ProgressView>> {
        let sql = format!(
            "SELECT {VIEW_COLUMNS} {VIEW_JOINS}
             WHERE p.user_id = ?1 AND p.course_id = ?2 AND p.activity_type = ?3
             ORDER BY p.completed_at"
        );
        let mut stmt = conn.prepare(&sql)?;
        let views = stmt
            .query_map(
                params![user_id, course_id, kind.as_str()],
                Self::row_to_view,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(views)
    }

    pub fn count(conn: &Connection) -> ApiResult<i64> {
        let count = conn.query_row("SELECT COUNT(*) FROM progress_logs", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_log(row: &Row<'_>) -> rusqlite::Result<ProgressLog> {
        let kind_raw: String = row.get(4)?;
        let kind = ActivityType::from_str(&kind_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Text,
                format!("unknown activity type {:?}", kind_raw).into(),
            )
        })?;
        Ok(ProgressLog {
            id: row.get(0)?,
            user_id: row.get(1)?,
            course_id: row.get(2)?,
            topic_id: row.get(3)?,
            activity: ActivityRef {
                kind,
                id: row.get(5)?,
            },
            is_correct: row.get(6)?,
            completed_at: parse_timestamp(7, row.get(7)?)?,
        })
    }

    fn row_to_view(row: &Row<'_>) -> rusqlite::Result<ProgressView> {
        Ok(ProgressView {
            id: row.get(0)?,
            user: UserRefView {
                id: row.get(1)?,
                username: row.get(2)?,
            },
            course: RefView {
                id: row.get(3)?,
                title: row.get(4)?,
            },
            topic: RefView {
                id: row.get(5)?,
                title: row.get(6)?,
            },
            activity_type: row.get(7)?,
            activity_table: row.get(8)?,
            activity_id: row.get(9)?,
            question: row.get(10)?,
            is_correct: row.get(11)?,
            completed_at: parse_timestamp(12, row.get(12)?)?,
        })
    }
}
