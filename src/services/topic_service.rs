//! Topic CRUD
//!
//! The topic row owns the course relationship. Reassigning a topic to
//! another course is one UPDATE; both courses' topic lists are computed
//! at read time, so there is no old-list/new-list bookkeeping to get
//! wrong.

use std::sync::Arc;

use tracing::info;

use crate::database::Database;
use crate::error::{ApiError, ApiResult};
use crate::models::{Topic, TopicInput, TopicResource};
use crate::repos::topic_repo::NewTopic;
use crate::repos::{CourseRepo, TopicRepo};

pub struct TopicService {
    db: Arc<Database>,
}

impl TopicService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn list(&self) -> ApiResult<Vec<Topic>> {
        let conn = self.db.conn()?;
        TopicRepo::list(&conn)
    }

    pub fn get(&self, id: &str) -> ApiResult<Topic> {
        let conn = self.db.conn()?;
        TopicRepo::get(&conn, id)?.ok_or_else(|| ApiError::not_found("Topic not found."))
    }

    pub fn create(&self, input: &TopicInput) -> ApiResult<Topic> {
        let title = input
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let (title, week, summary, course_id) = match (
            title,
            input.week,
            input.summary.as_deref(),
            input.course.as_deref(),
        ) {
            (Some(t), Some(w), Some(s), Some(c)) => (t, w, s, c),
            _ => return Err(ApiError::validation("Missing required fields.")),
        };
        let key_points = input
            .key_points
            .as_ref()
            .ok_or_else(|| ApiError::validation("Missing required fields."))?;
        let resources = input
            .resources
            .as_ref()
            .ok_or_else(|| ApiError::validation("Missing required fields."))?;

        validate_key_points(key_points)?;
        validate_resources(resources)?;

        let conn = self.db.conn()?;
        if !CourseRepo::exists(&conn, course_id)? {
            return Err(ApiError::validation(
                "Invalid course ID: Course does not exist.",
            ));
        }
        if TopicRepo::find_by_title(&conn, title)?.is_some() {
            return Err(ApiError::conflict(
                "A topic with this title already exists.",
            ));
        }

        TopicRepo::create(
            &conn,
            &NewTopic {
                title: title.to_string(),
                week,
                summary: summary.to_string(),
                key_points: key_points.clone(),
                resources: resources.clone(),
                course_id: course_id.to_string(),
            },
        )
    }

    pub fn update(&self, id: &str, input: &TopicInput) -> ApiResult<Topic> {
        if input.title.is_none()
            && input.week.is_none()
            && input.summary.is_none()
            && input.key_points.is_none()
            && input.resources.is_none()
            && input.course.is_none()
        {
            return Err(ApiError::validation("No update data provided."));
        }
        if let Some(key_points) = input.key_points.as_ref() {
            validate_key_points(key_points)?;
        }
        if let Some(resources) = input.resources.as_ref() {
            validate_resources(resources)?;
        }

        // Trim before the uniqueness check, same as create.
        let title = input.title.as_deref().map(str::trim);

        let conn = self.db.conn()?;
        let existing =
            TopicRepo::get(&conn, id)?.ok_or_else(|| ApiError::not_found("Topic not found."))?;

        if let Some(new_course) = input.course.as_deref() {
            if new_course != existing.course_id && !CourseRepo::exists(&conn, new_course)? {
                return Err(ApiError::validation(
                    "Invalid course ID: Course does not exist.",
                ));
            }
        }
        if let Some(title) = title {
            if let Some(other) = TopicRepo::find_by_title(&conn, title)? {
                if other != id {
                    return Err(ApiError::conflict(
                        "A topic with this title already exists.",
                    ));
                }
            }
        }

        TopicRepo::update(
            &conn,
            id,
            title,
            input.week,
            input.summary.as_deref(),
            input.key_points.as_deref(),
            input.resources.as_deref(),
            input.course.as_deref(),
        )?
        .ok_or_else(|| ApiError::not_found("Topic not found."))
    }

    /// Quizzes and exercises under the topic go with it (FK cascade);
    /// progress logs stay as historical facts.
    pub fn delete(&self, id: &str) -> ApiResult<()> {
        let conn = self.db.conn()?;
        if !TopicRepo::delete(&conn, id)? {
            return Err(ApiError::not_found("Topic not found."));
        }
        info!("[TopicService] Deleted topic {}", id);
        Ok(())
    }
}

fn validate_key_points(key_points: &[String]) -> ApiResult<()> {
    if key_points.is_empty() {
        return Err(ApiError::validation("Key points must be a non-empty array."));
    }
    Ok(())
}

fn validate_resources(resources: &[TopicResource]) -> ApiResult<()> {
    let valid = !resources.is_empty()
        && resources
            .iter()
            .all(|r| !r.title.trim().is_empty() && !r.link.trim().is_empty());
    if !valid {
        return Err(ApiError::validation(
            "Resources must be an array with a valid title and link.",
        ));
    }
    Ok(())
}
