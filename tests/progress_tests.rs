//! Progress-log writes and the per-user joined views.

mod common;

use common::TestEnv;
use studytrack_api::error::ApiError;
use studytrack_api::models::{ExerciseAttemptRequest, ProgressLogInput, QuizAttemptRequest};

fn log_input(user: &str, course: &str, topic: &str, kind: &str, activity: &str) -> ProgressLogInput {
    ProgressLogInput {
        user: Some(user.to_string()),
        course: Some(course.to_string()),
        topic: Some(topic.to_string()),
        activity_type: Some(kind.to_string()),
        activity_id: Some(activity.to_string()),
        is_correct: None,
    }
}

#[test]
fn log_names_every_missing_field() {
    let env = TestEnv::new();

    let err = env
        .progress()
        .log(&ProgressLogInput {
            user: None,
            course: Some("  ".to_string()),
            topic: None,
            activity_type: None,
            activity_id: None,
            is_correct: None,
        })
        .unwrap_err();

    let message = err.to_string();
    assert!(message.starts_with("Missing required fields:"));
    for field in ["user", "course", "topic", "activityType", "activityId"] {
        assert!(message.contains(field), "missing {field} in {message}");
    }
}

#[test]
fn log_rejects_unknown_activity_type() {
    let env = TestEnv::new();

    let err = env
        .progress()
        .log(&log_input("usr_1", "crs_1", "top_1", "osmosis", "act_1"))
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid activity type.");
}

#[test]
fn log_accepts_every_known_activity_type() {
    let env = TestEnv::new();

    for kind in ["topic", "quiz", "exercise", "coding", "debugging", "cicd"] {
        env.progress()
            .log(&log_input("usr_1", "crs_1", "top_1", kind, "act_1"))
            .unwrap();
    }
    assert_eq!(env.progress().list_all().unwrap().len(), 6);
}

#[test]
fn raw_log_does_not_check_references_and_dangles_as_null_titles() {
    let env = TestEnv::new();

    let log = env
        .progress()
        .log(&log_input("usr_ghost", "crs_ghost", "top_ghost", "topic", "top_ghost"))
        .unwrap();
    assert!(log.id.starts_with("plog_"));
    assert_eq!(log.activity.id, "top_ghost");

    let views = env.progress().for_user("usr_ghost").unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].user.username, None);
    assert_eq!(views[0].course.title, None);
    assert_eq!(views[0].topic.title, None);
    assert_eq!(views[0].activity_table, "topics");
}

#[test]
fn per_user_views_are_scoped() {
    let env = TestEnv::new();
    let alice = env.register_user("alice", "alice@example.com", None);
    let bob = env.register_user("bob", "bob@example.com", None);

    env.progress()
        .log(&log_input(&alice, "crs_1", "top_1", "topic", "top_1"))
        .unwrap();
    env.progress()
        .log(&log_input(&alice, "crs_1", "top_2", "topic", "top_2"))
        .unwrap();
    env.progress()
        .log(&log_input(&bob, "crs_1", "top_1", "topic", "top_1"))
        .unwrap();

    assert_eq!(env.progress().for_user(&alice).unwrap().len(), 2);
    assert_eq!(env.progress().for_user(&bob).unwrap().len(), 1);
    assert_eq!(env.progress().list_all().unwrap().len(), 3);
}

#[test]
fn user_with_no_history_gets_empty_lists_not_errors() {
    let env = TestEnv::new();
    let course = env.create_course("Rust 101");
    let user_id = env.register_user("sam", "sam@example.com", None);

    assert!(env.progress().for_user(&user_id).unwrap().is_empty());
    assert!(env.quizzes().user_attempts(&user_id).unwrap().is_empty());
    assert!(env.exercises().user_attempts(&user_id).unwrap().is_empty());
    assert!(env
        .quizzes()
        .user_progress(&user_id, &course.id)
        .unwrap()
        .is_empty());
}

#[test]
fn user_progress_requires_an_existing_course() {
    let env = TestEnv::new();
    let user_id = env.register_user("sam", "sam@example.com", None);

    let err = env
        .quizzes()
        .user_progress(&user_id, "crs_missing")
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn user_progress_filters_by_course_and_quiz_kind() {
    let env = TestEnv::new();
    let course_a = env.create_course("Rust 101");
    let course_b = env.create_course("Rust 201");
    let topic_a = env.create_topic(&course_a.id, "Ownership", 1);
    let topic_b = env.create_topic(&course_b.id, "Async", 1);
    let quiz_a = env.create_quiz(&topic_a.id, "QA?", &[("A", true), ("B", false)]);
    let quiz_b = env.create_quiz(&topic_b.id, "QB?", &[("A", true), ("B", false)]);
    let user_id = env.register_user("sam", "sam@example.com", None);

    env.quizzes()
        .attempt(
            &quiz_a.id,
            &user_id,
            &QuizAttemptRequest {
                selected_option_order: Some(1),
                course_id: Some(course_a.id.clone()),
            },
        )
        .unwrap();
    env.quizzes()
        .attempt(
            &quiz_b.id,
            &user_id,
            &QuizAttemptRequest {
                selected_option_order: Some(2),
                course_id: Some(course_b.id.clone()),
            },
        )
        .unwrap();
    // A non-quiz row in the same course must not show up.
    env.progress()
        .log(&log_input(&user_id, &course_a.id, &topic_a.id, "topic", &topic_a.id))
        .unwrap();

    let in_a = env.quizzes().user_progress(&user_id, &course_a.id).unwrap();
    assert_eq!(in_a.len(), 1);
    assert_eq!(in_a[0].activity_id, quiz_a.id);
    assert_eq!(in_a[0].question.as_deref(), Some("QA?"));
    assert_eq!(in_a[0].is_correct, Some(true));

    let in_b = env.quizzes().user_progress(&user_id, &course_b.id).unwrap();
    assert_eq!(in_b.len(), 1);
    assert_eq!(in_b[0].is_correct, Some(false));
}

#[test]
fn exercise_attempt_flow_records_supplied_correctness() {
    let env = TestEnv::new();
    let course = env.create_course("Rust 101");
    let topic = env.create_topic(&course.id, "Ownership", 1);
    let exercise = env
        .exercises()
        .create(&studytrack_api::models::ExerciseInput {
            topic: Some(topic.id.clone()),
            title: Some("Drills".to_string()),
            description: None,
            difficulty: Some("easy".to_string()),
            hints: None,
            solutions: None,
            questions: Some(vec![studytrack_api::models::ExerciseQuestion {
                question: "Explain moves".to_string(),
                question_type: studytrack_api::models::ExerciseQuestionType::ShortAnswer,
                correct_answer: None,
                options: None,
            }]),
        })
        .unwrap();
    let user_id = env.register_user("sam", "sam@example.com", None);

    let outcome = env
        .exercises()
        .attempt(
            &exercise.id,
            &user_id,
            &ExerciseAttemptRequest {
                course_id: Some(course.id.clone()),
                is_correct: Some(true),
            },
        )
        .unwrap();
    assert_eq!(outcome.topic_id, topic.id);

    // Ungraded attempt: correctness stays unset.
    env.exercises()
        .attempt(
            &exercise.id,
            &user_id,
            &ExerciseAttemptRequest {
                course_id: Some(course.id.clone()),
                is_correct: None,
            },
        )
        .unwrap();

    let attempts = env.exercises().user_attempts(&user_id).unwrap();
    assert_eq!(attempts.len(), 2);
    assert!(attempts
        .iter()
        .all(|a| a.activity_type == "exercise" && a.activity_table == "exercises"));
    let corrects: Vec<Option<bool>> = attempts.iter().map(|a| a.is_correct).collect();
    assert!(corrects.contains(&Some(true)));
    assert!(corrects.contains(&None));

    let err = env
        .exercises()
        .attempt(
            &exercise.id,
            &user_id,
            &ExerciseAttemptRequest {
                course_id: None,
                is_correct: None,
            },
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "Missing required fields: courseId");
}

#[test]
fn views_survive_deleting_the_underlying_topic() {
    let env = TestEnv::new();
    let course = env.create_course("Rust 101");
    let topic = env.create_topic(&course.id, "Ownership", 1);
    let quiz = env.create_quiz(&topic.id, "Q?", &[("A", true), ("B", false)]);
    let user_id = env.register_user("sam", "sam@example.com", None);

    env.quizzes()
        .attempt(
            &quiz.id,
            &user_id,
            &QuizAttemptRequest {
                selected_option_order: Some(1),
                course_id: Some(course.id.clone()),
            },
        )
        .unwrap();

    // Topic delete cascades to the quiz but the log row stays.
    env.topics().delete(&topic.id).unwrap();

    let attempts = env.quizzes().user_attempts(&user_id).unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].topic.title, None);
    assert_eq!(attempts[0].question, None);
    assert_eq!(attempts[0].is_correct, Some(true));
}
