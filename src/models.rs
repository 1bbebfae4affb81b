//! Domain model and wire DTOs
//!
//! Wire field names follow the external JSON contract (camelCase, with
//! `key_points` kept as-is). Enums stored in SQLite go through
//! `as_str`/`from_str` string forms.

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Role::Student),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Full user record including the password hash. Never serialized; wire
/// responses go through [`PublicUser`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wire-safe projection of a user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        PublicUser {
            id: u.id,
            username: u.username,
            email: u.email,
            role: u.role,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

// ============================================================================
// Curriculum: Course / Topic
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Reference to the admin user teaching the course.
    pub teacher: String,
    pub scope: String,
    pub semester: String,
    pub learning_objectives: Vec<String>,
    pub skills: Vec<String>,
    pub competencies: Vec<String>,
    /// Topic ids, computed at read time from `topics.course_id`.
    pub topics: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicResource {
    pub title: String,
    pub link: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub week: i64,
    pub summary: String,
    #[serde(rename = "key_points")]
    pub key_points: Vec<String>,
    pub resources: Vec<TopicResource>,
    /// Owning course id. The authoritative side of the relationship.
    #[serde(rename = "course")]
    pub course_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Quiz
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOption {
    pub text: String,
    pub is_correct: bool,
    /// 1-based display rank, also the attempt-submission key.
    pub order: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    #[serde(rename = "topic")]
    pub topic_id: String,
    pub question: String,
    /// Always sorted ascending by `order`.
    pub options: Vec<QuizOption>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Exercise
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseQuestionType {
    MultipleChoice,
    FillInTheBlank,
    Coding,
    ShortAnswer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseQuestion {
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: ExerciseQuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuizOption>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    /// One exercise per topic.
    #[serde(rename = "topic")]
    pub topic_id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub hints: Vec<String>,
    pub solutions: Vec<String>,
    pub questions: Vec<ExerciseQuestion>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Progress log
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityType {
    Topic,
    Quiz,
    Exercise,
    Coding,
    Debugging,
    Cicd,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Topic => "topic",
            ActivityType::Quiz => "quiz",
            ActivityType::Exercise => "exercise",
            ActivityType::Coding => "coding",
            ActivityType::Debugging => "debugging",
            ActivityType::Cicd => "cicd",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "topic" => Some(ActivityType::Topic),
            "quiz" => Some(ActivityType::Quiz),
            "exercise" => Some(ActivityType::Exercise),
            "coding" => Some(ActivityType::Coding),
            "debugging" => Some(ActivityType::Debugging),
            "cicd" => Some(ActivityType::Cicd),
            _ => None,
        }
    }

    /// Name of the collection the activity id resolves against.
    pub fn table(&self) -> &'static str {
        match self {
            ActivityType::Topic => "topics",
            ActivityType::Quiz => "quizzes",
            ActivityType::Exercise => "exercises",
            ActivityType::Coding => "coding",
            ActivityType::Debugging => "debugging",
            ActivityType::Cicd => "cicd",
        }
    }
}

/// Typed polymorphic activity reference. On the wire it flattens to the
/// `activityType`/`activityTable`/`activityId` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRef {
    pub kind: ActivityType,
    pub id: String,
}

/// Append-only fact recording that a user attempted or completed an
/// activity. Never mutated after insert.
#[derive(Debug, Clone)]
pub struct ProgressLog {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub topic_id: String,
    pub activity: ActivityRef,
    pub is_correct: Option<bool>,
    pub completed_at: DateTime<Utc>,
}

impl Serialize for ProgressLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ProgressLog", 9)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("user", &self.user_id)?;
        s.serialize_field("course", &self.course_id)?;
        s.serialize_field("topic", &self.topic_id)?;
        s.serialize_field("activityType", self.activity.kind.as_str())?;
        s.serialize_field("activityTable", self.activity.kind.table())?;
        s.serialize_field("activityId", &self.activity.id)?;
        s.serialize_field("isCorrect", &self.is_correct)?;
        s.serialize_field("completedAt", &self.completed_at)?;
        s.end()
    }
}

/// `{id, title}` pair used when a populated reference may dangle.
#[derive(Debug, Clone, Serialize)]
pub struct RefView {
    pub id: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserRefView {
    pub id: String,
    pub username: Option<String>,
}

/// Progress log joined with the titles of the referenced aggregates.
/// Dangling references surface as `null` titles (accepted weakness).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub id: String,
    pub user: UserRefView,
    pub course: RefView,
    pub topic: RefView,
    pub activity_type: String,
    pub activity_table: String,
    pub activity_id: String,
    /// Question text of the referenced quiz, when populated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    pub is_correct: Option<bool>,
    pub completed_at: DateTime<Utc>,
}

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub teacher: Option<String>,
    pub scope: Option<String>,
    pub semester: Option<String>,
    #[serde(default)]
    pub learning_objectives: Option<Vec<String>>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub competencies: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct TopicInput {
    pub title: Option<String>,
    pub week: Option<i64>,
    pub summary: Option<String>,
    #[serde(default)]
    pub key_points: Option<Vec<String>>,
    #[serde(default)]
    pub resources: Option<Vec<TopicResource>>,
    /// Course id the topic belongs to.
    pub course: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOptionInput {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
    /// Optional explicit rank; assigned from 1-based position when absent.
    pub order: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct QuizInput {
    /// Topic id.
    pub topic: Option<String>,
    pub question: Option<String>,
    pub options: Option<Vec<QuizOptionInput>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttemptRequest {
    pub selected_option_order: Option<i64>,
    pub course_id: Option<String>,
}

/// Outcome returned to the attempting user. No aggregate score here;
/// progress views are computed separately.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttemptOutcome {
    pub message: String,
    pub is_correct: bool,
    pub topic_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseInput {
    /// Topic id.
    pub topic: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<String>,
    #[serde(default)]
    pub hints: Option<Vec<String>>,
    #[serde(default)]
    pub solutions: Option<Vec<String>>,
    pub questions: Option<Vec<ExerciseQuestion>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseAttemptRequest {
    pub course_id: Option<String>,
    pub is_correct: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseAttemptOutcome {
    pub message: String,
    pub topic_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressLogInput {
    pub user: Option<String>,
    pub course: Option<String>,
    pub topic: Option<String>,
    pub activity_type: Option<String>,
    pub activity_id: Option<String>,
    pub is_correct: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    /// Wire name is `newRole`; the bare `role` spelling is accepted too.
    #[serde(rename = "newRole", alias = "role")]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_log_flattens_to_nine_wire_fields() {
        let log = ProgressLog {
            id: "plog_1".to_string(),
            user_id: "usr_1".to_string(),
            course_id: "crs_1".to_string(),
            topic_id: "top_1".to_string(),
            activity: ActivityRef {
                kind: ActivityType::Quiz,
                id: "qz_1".to_string(),
            },
            is_correct: Some(true),
            completed_at: chrono::Utc::now(),
        };

        let value = serde_json::to_value(&log).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 9);
        assert_eq!(object["activityType"], "quiz");
        assert_eq!(object["activityTable"], "quizzes");
        assert_eq!(object["activityId"], "qz_1");
        assert_eq!(object["isCorrect"], true);
    }

    #[test]
    fn role_update_accepts_both_wire_names() {
        let req: UpdateRoleRequest = serde_json::from_str(r#"{"newRole":"admin"}"#).unwrap();
        assert_eq!(req.role.as_deref(), Some("admin"));

        let req: UpdateRoleRequest = serde_json::from_str(r#"{"role":"student"}"#).unwrap();
        assert_eq!(req.role.as_deref(), Some("student"));
    }
}
