//! Exercise CRUD and attempts
//!
//! Mirrors the quiz attempt pipeline; correctness is supplied by the
//! client (exercises are graded outside this service) and recorded on
//! the progress log as-is.

use std::sync::Arc;

use tracing::info;

use crate::database::Database;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    ActivityRef, ActivityType, Difficulty, Exercise, ExerciseAttemptOutcome,
    ExerciseAttemptRequest, ExerciseInput, ExerciseQuestion, ExerciseQuestionType, ProgressView,
};
use crate::repos::exercise_repo::NewExercise;
use crate::repos::progress_repo::NewProgressLog;
use crate::repos::{ExerciseRepo, ProgressRepo, TopicRepo};

pub struct ExerciseService {
    db: Arc<Database>,
}

impl ExerciseService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn list(&self, topic_id: Option<&str>) -> ApiResult<Vec<Exercise>> {
        let conn = self.db.conn()?;
        ExerciseRepo::list(&conn, topic_id)
    }

    pub fn get(&self, id: &str) -> ApiResult<Exercise> {
        let conn = self.db.conn()?;
        ExerciseRepo::get(&conn, id)?.ok_or_else(|| ApiError::not_found("Exercise not found."))
    }

    pub fn create(&self, input: &ExerciseInput) -> ApiResult<Exercise> {
        let (topic_id, title, difficulty_raw, questions) = match (
            input.topic.as_deref(),
            input.title.as_deref(),
            input.difficulty.as_deref(),
            input.questions.as_ref(),
        ) {
            (Some(t), Some(ti), Some(d), Some(q)) if !ti.trim().is_empty() => (t, ti.trim(), d, q),
            _ => return Err(ApiError::validation("Missing required fields.")),
        };

        let difficulty = Difficulty::from_str(difficulty_raw).ok_or_else(|| {
            ApiError::validation("Invalid difficulty. Must be 'easy', 'medium' or 'hard'.")
        })?;
        validate_questions(questions)?;

        let conn = self.db.conn()?;
        if !TopicRepo::exists(&conn, topic_id)? {
            return Err(ApiError::validation(
                "Invalid topic ID: Topic does not exist.",
            ));
        }
        if ExerciseRepo::exists_for_topic(&conn, topic_id)? {
            return Err(ApiError::conflict(
                "An exercise already exists for this topic.",
            ));
        }

        ExerciseRepo::create(
            &conn,
            &NewExercise {
                topic_id: topic_id.to_string(),
                title: title.to_string(),
                description: input.description.clone().unwrap_or_default(),
                difficulty,
                hints: input.hints.clone().unwrap_or_default(),
                solutions: input.solutions.clone().unwrap_or_default(),
                questions: questions.clone(),
            },
        )
    }

    pub fn update(&self, id: &str, input: &ExerciseInput) -> ApiResult<Exercise> {
        if input.topic.is_none()
            && input.title.is_none()
            && input.description.is_none()
            && input.difficulty.is_none()
            && input.hints.is_none()
            && input.solutions.is_none()
            && input.questions.is_none()
        {
            return Err(ApiError::validation("No update data provided."));
        }

        let difficulty = input
            .difficulty
            .as_deref()
            .map(|raw| {
                Difficulty::from_str(raw).ok_or_else(|| {
                    ApiError::validation("Invalid difficulty. Must be 'easy', 'medium' or 'hard'.")
                })
            })
            .transpose()?;
        if let Some(questions) = input.questions.as_ref() {
            validate_questions(questions)?;
        }

        let conn = self.db.conn()?;
        if let Some(topic_id) = input.topic.as_deref() {
            if !TopicRepo::exists(&conn, topic_id)? {
                return Err(ApiError::validation(
                    "Invalid topic ID: Topic does not exist.",
                ));
            }
        }

        ExerciseRepo::update(
            &conn,
            id,
            input.topic.as_deref(),
            input.title.as_deref(),
            input.description.as_deref(),
            difficulty,
            input.hints.as_deref(),
            input.solutions.as_deref(),
            input.questions.as_deref(),
        )?
        .ok_or_else(|| ApiError::not_found("Exercise not found."))
    }

    pub fn delete(&self, id: &str) -> ApiResult<()> {
        let conn = self.db.conn()?;
        if !ExerciseRepo::delete(&conn, id)? {
            return Err(ApiError::not_found("Exercise not found."));
        }
        info!("[ExerciseService] Deleted exercise {}", id);
        Ok(())
    }

    /// Same shape as the quiz attempt: all checks run before the single
    /// progress-log insert.
    pub fn attempt(
        &self,
        exercise_id: &str,
        user_id: &str,
        req: &ExerciseAttemptRequest,
    ) -> ApiResult<ExerciseAttemptOutcome> {
        let course_id = match req.course_id.as_deref().filter(|c| !c.is_empty()) {
            Some(c) => c,
            None => {
                return Err(ApiError::validation("Missing required fields: courseId"));
            }
        };

        let conn = self.db.conn()?;
        let exercise = ExerciseRepo::get(&conn, exercise_id)?
            .ok_or_else(|| ApiError::not_found("Exercise not found."))?;

        let topic = TopicRepo::get(&conn, &exercise.topic_id)?
            .ok_or_else(|| ApiError::validation("Invalid exercise: Topic not found"))?;

        if topic.course_id != course_id {
            return Err(ApiError::validation(
                "Invalid course ID: This exercise's topic does not belong to the provided course.",
            ));
        }

        ProgressRepo::insert(
            &conn,
            &NewProgressLog {
                user_id: user_id.to_string(),
                course_id: course_id.to_string(),
                topic_id: topic.id.clone(),
                activity: ActivityRef {
                    kind: ActivityType::Exercise,
                    id: exercise.id.clone(),
                },
                is_correct: req.is_correct,
            },
        )?;

        Ok(ExerciseAttemptOutcome {
            message: "Exercise attempt logged".to_string(),
            topic_id: topic.id,
        })
    }

    pub fn user_attempts(&self, user_id: &str) -> ApiResult<Vec<ProgressView>> {
        let conn = self.db.conn()?;
        ProgressRepo::attempts_for_user(&conn, user_id, ActivityType::Exercise)
    }
}

fn validate_questions(questions: &[ExerciseQuestion]) -> ApiResult<()> {
    if questions.is_empty() {
        return Err(ApiError::validation("At least one question is required."));
    }
    for question in questions {
        if question.question_type == ExerciseQuestionType::MultipleChoice
            && question.options.as_ref().map_or(true, |o| o.is_empty())
        {
            return Err(ApiError::validation(format!(
                "Multiple-choice question \"{}\" must have at least one option.",
                question.question
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(kind: ExerciseQuestionType, options: Option<Vec<crate::models::QuizOption>>) -> ExerciseQuestion {
        ExerciseQuestion {
            question: "What does ownership mean?".to_string(),
            question_type: kind,
            correct_answer: None,
            options,
        }
    }

    #[test]
    fn multiple_choice_requires_options() {
        let err =
            validate_questions(&[question(ExerciseQuestionType::MultipleChoice, None)])
                .unwrap_err();
        assert!(err.to_string().contains("at least one option"));
    }

    #[test]
    fn short_answer_needs_no_options() {
        validate_questions(&[question(ExerciseQuestionType::ShortAnswer, None)]).unwrap();
    }

    #[test]
    fn empty_question_list_rejected() {
        assert!(validate_questions(&[]).is_err());
    }
}
