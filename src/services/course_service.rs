//! Course CRUD
//!
//! Courses never write the topic back-reference; reads compute it from
//! the topics table, so creation and update stay single-row operations.

use std::sync::Arc;

use tracing::info;

use crate::database::Database;
use crate::error::{ApiError, ApiResult};
use crate::models::{Course, CourseInput};
use crate::repos::course_repo::NewCourse;
use crate::repos::{CourseRepo, TopicRepo};

pub struct CourseService {
    db: Arc<Database>,
}

impl CourseService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn list(&self) -> ApiResult<Vec<Course>> {
        let conn = self.db.conn()?;
        CourseRepo::list(&conn)
    }

    pub fn get(&self, id: &str) -> ApiResult<Course> {
        let conn = self.db.conn()?;
        CourseRepo::get(&conn, id)?.ok_or_else(|| ApiError::not_found("Course not found"))
    }

    pub fn create(&self, input: &CourseInput) -> ApiResult<Course> {
        let title = required(input.title.as_deref())?;
        let description = required(input.description.as_deref())?;

        let conn = self.db.conn()?;
        if CourseRepo::find_by_title(&conn, title)?.is_some() {
            return Err(ApiError::conflict(
                "A course with this title already exists.",
            ));
        }

        CourseRepo::create(
            &conn,
            &NewCourse {
                title: title.to_string(),
                description: description.to_string(),
                teacher: input.teacher.clone().unwrap_or_default(),
                scope: input.scope.clone().unwrap_or_default(),
                semester: input.semester.clone().unwrap_or_default(),
                learning_objectives: input.learning_objectives.clone().unwrap_or_default(),
                skills: input.skills.clone().unwrap_or_default(),
                competencies: input.competencies.clone().unwrap_or_default(),
            },
        )
    }

    pub fn update(&self, id: &str, input: &CourseInput) -> ApiResult<Course> {
        if input.title.is_none()
            && input.description.is_none()
            && input.teacher.is_none()
            && input.scope.is_none()
            && input.semester.is_none()
            && input.learning_objectives.is_none()
            && input.skills.is_none()
            && input.competencies.is_none()
        {
            return Err(ApiError::validation("No update data provided."));
        }

        // Trim before the uniqueness check, same as create.
        let title = input.title.as_deref().map(str::trim);

        let conn = self.db.conn()?;
        if let Some(title) = title {
            if let Some(other) = CourseRepo::find_by_title(&conn, title)? {
                if other != id {
                    return Err(ApiError::conflict(
                        "A course with this title already exists.",
                    ));
                }
            }
        }

        CourseRepo::update(
            &conn,
            id,
            title,
            input.description.as_deref(),
            input.teacher.as_deref(),
            input.scope.as_deref(),
            input.semester.as_deref(),
            input.learning_objectives.as_deref(),
            input.skills.as_deref(),
            input.competencies.as_deref(),
        )?
        .ok_or_else(|| ApiError::not_found("Course not found"))
    }

    /// Deleting a course is refused while topics still reference it; the
    /// caller must move or delete those topics first. Progress logs are
    /// never touched.
    pub fn delete(&self, id: &str) -> ApiResult<()> {
        let conn = self.db.conn()?;
        if !CourseRepo::exists(&conn, id)? {
            return Err(ApiError::not_found("Course not found"));
        }
        let topic_count = TopicRepo::count_for_course(&conn, id)?;
        if topic_count > 0 {
            return Err(ApiError::validation(
                "Cannot delete course: topics still reference it.",
            ));
        }
        CourseRepo::delete(&conn, id)?;
        info!("[CourseService] Deleted course {}", id);
        Ok(())
    }
}

fn required(value: Option<&str>) -> ApiResult<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation("Missing required fields."))
}
