//! Business rules per component
//!
//! Each service owns a handle to the shared database and enforces the
//! validation/consistency contract for its aggregate; handlers stay thin.

pub mod auth_service;
pub mod course_service;
pub mod exercise_service;
pub mod progress_service;
pub mod quiz_service;
pub mod topic_service;
pub mod user_service;

pub use auth_service::{AuthService, AuthUser};
pub use course_service::CourseService;
pub use exercise_service::ExerciseService;
pub use progress_service::ProgressService;
pub use quiz_service::QuizService;
pub use topic_service::TopicService;
pub use user_service::UserService;
