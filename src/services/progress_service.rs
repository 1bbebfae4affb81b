//! Progress-log writes and per-user views
//!
//! `log` is a raw insert: required-field presence only, no referential
//! checks. It is also what the quiz/exercise attempt pipelines call, so
//! every learner activity goes through one write path.

use std::sync::Arc;

use crate::database::Database;
use crate::error::{ApiError, ApiResult};
use crate::models::{ActivityRef, ActivityType, ProgressLog, ProgressLogInput, ProgressView};
use crate::repos::progress_repo::NewProgressLog;
use crate::repos::ProgressRepo;

pub struct ProgressService {
    db: Arc<Database>,
}

impl ProgressService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn log(&self, input: &ProgressLogInput) -> ApiResult<ProgressLog> {
        let mut missing = Vec::new();
        if blank(input.user.as_deref()) {
            missing.push("user");
        }
        if blank(input.course.as_deref()) {
            missing.push("course");
        }
        if blank(input.topic.as_deref()) {
            missing.push("topic");
        }
        if blank(input.activity_type.as_deref()) {
            missing.push("activityType");
        }
        if blank(input.activity_id.as_deref()) {
            missing.push("activityId");
        }
        if !missing.is_empty() {
            return Err(ApiError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let kind_raw = input.activity_type.as_deref().unwrap_or_default();
        let kind = ActivityType::from_str(kind_raw)
            .ok_or_else(|| ApiError::validation("Invalid activity type."))?;

        let conn = self.db.conn()?;
        ProgressRepo::insert(
            &conn,
            &NewProgressLog {
                user_id: input.user.clone().unwrap_or_default(),
                course_id: input.course.clone().unwrap_or_default(),
                topic_id: input.topic.clone().unwrap_or_default(),
                activity: ActivityRef {
                    kind,
                    id: input.activity_id.clone().unwrap_or_default(),
                },
                is_correct: input.is_correct,
            },
        )
    }

    pub fn list_all(&self) -> ApiResult<Vec<ProgressView>> {
        let conn = self.db.conn()?;
        ProgressRepo::list_all(&conn)
    }

    pub fn for_user(&self, user_id: &str) -> ApiResult<Vec<ProgressView>> {
        let conn = self.db.conn()?;
        ProgressRepo::list_for_user(&conn, user_id)
    }
}

fn blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}
