//! Shared fixtures for the integration suites

#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;

use studytrack_api::database::Database;
use studytrack_api::models::{
    Course, CourseInput, Quiz, QuizInput, QuizOptionInput, RegisterRequest, Topic, TopicInput,
    TopicResource,
};
use studytrack_api::services::{
    AuthService, CourseService, ExerciseService, ProgressService, QuizService, TopicService,
    UserService,
};

pub const TEST_SECRET: &str = "test-secret";
/// Low bcrypt cost keeps the auth suites fast.
pub const TEST_BCRYPT_COST: u32 = 4;

pub struct TestEnv {
    pub db: Arc<Database>,
    // Held so the database file outlives the test.
    _dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db = Arc::new(Database::open(&dir.path().join("test.db")).expect("open database"));
        TestEnv { db, _dir: dir }
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.db.clone(), TEST_SECRET.to_string(), TEST_BCRYPT_COST)
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.db.clone())
    }

    pub fn courses(&self) -> CourseService {
        CourseService::new(self.db.clone())
    }

    pub fn topics(&self) -> TopicService {
        TopicService::new(self.db.clone())
    }

    pub fn quizzes(&self) -> QuizService {
        QuizService::new(self.db.clone())
    }

    pub fn exercises(&self) -> ExerciseService {
        ExerciseService::new(self.db.clone())
    }

    pub fn progress(&self) -> ProgressService {
        ProgressService::new(self.db.clone())
    }

    pub fn register_user(&self, username: &str, email: &str, role: Option<&str>) -> String {
        self.auth()
            .register(&RegisterRequest {
                username: Some(username.to_string()),
                email: Some(email.to_string()),
                password: Some("hunter2!".to_string()),
                role: role.map(str::to_string),
            })
            .expect("register user")
            .id
    }

    pub fn create_course(&self, title: &str) -> Course {
        self.courses()
            .create(&CourseInput {
                title: Some(title.to_string()),
                description: Some("A course about things".to_string()),
                teacher: Some("usr_teacher".to_string()),
                scope: Some("core".to_string()),
                semester: Some("2026S".to_string()),
                learning_objectives: Some(vec!["learn".to_string()]),
                skills: Some(vec!["skill".to_string()]),
                competencies: Some(vec!["competency".to_string()]),
            })
            .expect("create course")
    }

    pub fn create_topic(&self, course_id: &str, title: &str, week: i64) -> Topic {
        self.topics()
            .create(&TopicInput {
                title: Some(title.to_string()),
                week: Some(week),
                summary: Some("Summary".to_string()),
                key_points: Some(vec!["point one".to_string()]),
                resources: Some(vec![TopicResource {
                    title: "Reading".to_string(),
                    link: "https://example.com/reading".to_string(),
                }]),
                course: Some(course_id.to_string()),
            })
            .expect("create topic")
    }

    pub fn create_quiz(&self, topic_id: &str, question: &str, options: &[(&str, bool)]) -> Quiz {
        self.quizzes()
            .create(&quiz_input(topic_id, question, options))
            .expect("create quiz")
    }
}

pub fn quiz_input(topic_id: &str, question: &str, options: &[(&str, bool)]) -> QuizInput {
    QuizInput {
        topic: Some(topic_id.to_string()),
        question: Some(question.to_string()),
        options: Some(
            options
                .iter()
                .map(|(text, is_correct)| QuizOptionInput {
                    text: (*text).to_string(),
                    is_correct: *is_correct,
                    order: None,
                })
                .collect(),
        ),
    }
}
