//! Quiz engine
//!
//! Structural validation of quiz definitions, option normalization, and
//! the attempt pipeline: resolve quiz -> topic -> course, check the
//! submitted course matches the topic's course, match the selected option
//! by its `order`, then append exactly one progress-log row. Nothing
//! deduplicates repeated attempts; retakes are independent rows by
//! design.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use crate::database::Database;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    ActivityRef, ActivityType, ProgressView, Quiz, QuizAttemptOutcome, QuizAttemptRequest,
    QuizInput, QuizOption, QuizOptionInput,
};
use crate::repos::progress_repo::NewProgressLog;
use crate::repos::{CourseRepo, ProgressRepo, QuizRepo, TopicRepo};

pub struct QuizService {
    db: Arc<Database>,
}

impl QuizService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    // ========================================================================
    // CRUD
    // ========================================================================

    pub fn list(&self) -> ApiResult<Vec<Quiz>> {
        let conn = self.db.conn()?;
        QuizRepo::list(&conn)
    }

    pub fn get(&self, id: &str) -> ApiResult<Quiz> {
        let conn = self.db.conn()?;
        QuizRepo::get(&conn, id)?.ok_or_else(|| ApiError::not_found("Quiz not found"))
    }

    pub fn list_by_topic(&self, topic_id: &str) -> ApiResult<Vec<Quiz>> {
        let conn = self.db.conn()?;
        if !TopicRepo::exists(&conn, topic_id)? {
            return Err(ApiError::validation(
                "Invalid topic ID: Topic does not exist.",
            ));
        }
        let quizzes = QuizRepo::list_by_topic(&conn, topic_id)?;
        if quizzes.is_empty() {
            return Err(ApiError::not_found("No quizzes found for this topic."));
        }
        Ok(quizzes)
    }

    pub fn create(&self, input: &QuizInput) -> ApiResult<Quiz> {
        let (topic_id, question, options) = match (
            input.topic.as_deref(),
            input.question.as_deref(),
            input.options.as_ref(),
        ) {
            (Some(t), Some(q), Some(o)) if !q.trim().is_empty() => (t, q.trim(), o),
            _ => return Err(missing_quiz_fields()),
        };
        let options = validate_and_normalize_options(options)?;

        let conn = self.db.conn()?;
        if !TopicRepo::exists(&conn, topic_id)? {
            return Err(ApiError::validation(
                "Invalid topic ID: Topic does not exist.",
            ));
        }
        if QuizRepo::find_by_question(&conn, question)?.is_some() {
            return Err(ApiError::conflict(
                "A quiz with this question already exists.",
            ));
        }

        QuizRepo::create(&conn, topic_id, question, &options)
    }

    pub fn update(&self, id: &str, input: &QuizInput) -> ApiResult<Quiz> {
        if input.topic.is_none() && input.question.is_none() && input.options.is_none() {
            return Err(ApiError::validation(
                "At least one field (topic, question, or options) must be provided to update a quiz.",
            ));
        }

        let options = input
            .options
            .as_ref()
            .map(|opts| validate_and_normalize_options(opts))
            .transpose()?;
        // Trim before the uniqueness check, same as create.
        let question = input.question.as_deref().map(str::trim);

        let conn = self.db.conn()?;
        if let Some(topic_id) = input.topic.as_deref() {
            if !TopicRepo::exists(&conn, topic_id)? {
                return Err(ApiError::validation(
                    "Invalid topic ID: Topic does not exist.",
                ));
            }
        }
        if let Some(question) = question {
            if let Some(other) = QuizRepo::find_by_question(&conn, question)? {
                if other != id {
                    return Err(ApiError::conflict(
                        "A quiz with this question already exists.",
                    ));
                }
            }
        }

        QuizRepo::update(
            &conn,
            id,
            input.topic.as_deref(),
            question,
            options.as_deref(),
        )?
        .ok_or_else(|| ApiError::not_found("Quiz not found"))
    }

    pub fn delete(&self, id: &str) -> ApiResult<()> {
        let conn = self.db.conn()?;
        if !QuizRepo::delete(&conn, id)? {
            return Err(ApiError::not_found("Quiz not found"));
        }
        info!("[QuizService] Deleted quiz {}", id);
        Ok(())
    }

    // ========================================================================
    // Attempts
    // ========================================================================

    /// Validate an attempt and append exactly one progress-log row.
    /// Every failure path returns before the insert, so a rejected attempt
    /// never leaves a partial write.
    pub fn attempt(
        &self,
        quiz_id: &str,
        user_id: &str,
        req: &QuizAttemptRequest,
    ) -> ApiResult<QuizAttemptOutcome> {
        let selected = req.selected_option_order;
        let course = req.course_id.as_deref().filter(|c| !c.is_empty());

        let mut missing = Vec::new();
        if user_id.is_empty() {
            missing.push("userId");
        }
        if quiz_id.is_empty() {
            missing.push("quizId");
        }
        if selected.is_none() {
            missing.push("selectedOptionOrder");
        }
        if course.is_none() {
            missing.push("courseId");
        }
        let (Some(selected_order), Some(course_id)) = (selected, course) else {
            return Err(ApiError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        };
        if !missing.is_empty() {
            return Err(ApiError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let conn = self.db.conn()?;
        let quiz =
            QuizRepo::get(&conn, quiz_id)?.ok_or_else(|| ApiError::not_found("Quiz not found"))?;

        // Missing topic row is a data-integrity fault, not a lookup miss.
        let topic = TopicRepo::get(&conn, &quiz.topic_id)?
            .ok_or_else(|| ApiError::validation("Invalid quiz: Topic not found"))?;

        // Core consistency check: no cross-course attempt logging.
        if topic.course_id != course_id {
            return Err(ApiError::validation(
                "Invalid course ID: This quiz's topic does not belong to the provided course.",
            ));
        }

        let option = quiz
            .options
            .iter()
            .find(|o| o.order == selected_order)
            .ok_or_else(|| {
                ApiError::validation(
                    "Invalid option selected. No matching option found for this quiz.",
                )
            })?;

        ProgressRepo::insert(
            &conn,
            &NewProgressLog {
                user_id: user_id.to_string(),
                course_id: course_id.to_string(),
                topic_id: topic.id.clone(),
                activity: ActivityRef {
                    kind: ActivityType::Quiz,
                    id: quiz.id.clone(),
                },
                is_correct: Some(option.is_correct),
            },
        )?;

        Ok(QuizAttemptOutcome {
            message: "Quiz attempt logged".to_string(),
            is_correct: option.is_correct,
            topic_id: topic.id,
        })
    }

    /// All quiz attempts of a user, populated with course/topic titles and
    /// the quiz question. Empty list when none.
    pub fn user_attempts(&self, user_id: &str) -> ApiResult<Vec<ProgressView>> {
        let conn = self.db.conn()?;
        ProgressRepo::attempts_for_user(&conn, user_id, ActivityType::Quiz)
    }

    /// Quiz attempts of a user within one course. The course must exist;
    /// an empty list is a valid answer.
    pub fn user_progress(&self, user_id: &str, course_id: &str) -> ApiResult<Vec<ProgressView>> {
        let conn = self.db.conn()?;
        if !CourseRepo::exists(&conn, course_id)? {
            return Err(ApiError::not_found("Course not found"));
        }
        ProgressRepo::attempts_for_user_course(&conn, user_id, course_id, ActivityType::Quiz)
    }
}

fn missing_quiz_fields() -> ApiError {
    ApiError::validation(
        "All fields are required, and options must contain at least two choices.",
    )
}

/// Enforce the option invariants and produce the stored form: trimmed
/// text, explicit 1-based `order` (from position when not supplied),
/// unique order values.
fn validate_and_normalize_options(options: &[QuizOptionInput]) -> ApiResult<Vec<QuizOption>> {
    if options.len() < 2 {
        return Err(missing_quiz_fields());
    }
    if !options.iter().any(|o| o.is_correct) {
        return Err(ApiError::validation(
            "At least one option must be marked as correct.",
        ));
    }

    let normalized: Vec<QuizOption> = options
        .iter()
        .enumerate()
        .map(|(index, o)| QuizOption {
            text: o.text.trim().to_string(),
            is_correct: o.is_correct,
            order: o.order.unwrap_or(index as i64 + 1),
        })
        .collect();

    let mut seen = HashSet::new();
    if !normalized.iter().all(|o| seen.insert(o.order)) {
        return Err(ApiError::validation(
            "Option order values must be unique within a quiz.",
        ));
    }

    Ok(normalized)
}
