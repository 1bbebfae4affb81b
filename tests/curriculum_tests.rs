//! Course, topic and exercise lifecycle: uniqueness, computed topic
//! lists, reassignment and deletion semantics.

mod common;

use common::TestEnv;
use studytrack_api::error::ApiError;
use studytrack_api::models::{
    CourseInput, ExerciseInput, ExerciseQuestion, ExerciseQuestionType, TopicInput,
};

fn blank_course_input() -> CourseInput {
    CourseInput {
        title: None,
        description: None,
        teacher: None,
        scope: None,
        semester: None,
        learning_objectives: None,
        skills: None,
        competencies: None,
    }
}

fn blank_topic_input() -> TopicInput {
    TopicInput {
        title: None,
        week: None,
        summary: None,
        key_points: None,
        resources: None,
        course: None,
    }
}

fn exercise_input(topic_id: &str, title: &str) -> ExerciseInput {
    ExerciseInput {
        topic: Some(topic_id.to_string()),
        title: Some(title.to_string()),
        description: Some("Practice".to_string()),
        difficulty: Some("medium".to_string()),
        hints: None,
        solutions: None,
        questions: Some(vec![ExerciseQuestion {
            question: "Explain borrowing".to_string(),
            question_type: ExerciseQuestionType::ShortAnswer,
            correct_answer: None,
            options: None,
        }]),
    }
}

#[test]
fn course_titles_are_unique() {
    let env = TestEnv::new();
    env.create_course("Rust 101");

    let err = env
        .courses()
        .create(&CourseInput {
            title: Some("Rust 101".to_string()),
            description: Some("Again".to_string()),
            ..blank_course_input()
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[test]
fn course_topics_list_is_computed_from_topic_rows() {
    let env = TestEnv::new();
    let course = env.create_course("Rust 101");
    assert!(course.topics.is_empty());

    let t1 = env.create_topic(&course.id, "Ownership", 2);
    let t2 = env.create_topic(&course.id, "Intro", 1);

    let fetched = env.courses().get(&course.id).unwrap();
    // Ordered by week.
    assert_eq!(fetched.topics, vec![t2.id.clone(), t1.id.clone()]);
}

#[test]
fn reassigning_a_topic_moves_it_between_computed_lists() {
    let env = TestEnv::new();
    let course_a = env.create_course("Rust 101");
    let course_b = env.create_course("Rust 201");
    let topic = env.create_topic(&course_a.id, "Ownership", 1);

    env.topics()
        .update(
            &topic.id,
            &TopicInput {
                course: Some(course_b.id.clone()),
                ..blank_topic_input()
            },
        )
        .unwrap();

    assert!(env.courses().get(&course_a.id).unwrap().topics.is_empty());
    assert_eq!(
        env.courses().get(&course_b.id).unwrap().topics,
        vec![topic.id]
    );
}

#[test]
fn topic_create_validates_course_title_and_arrays() {
    let env = TestEnv::new();
    let course = env.create_course("Rust 101");
    env.create_topic(&course.id, "Ownership", 1);

    let err = env
        .topics()
        .create(&TopicInput {
            title: Some("Ownership".to_string()),
            week: Some(2),
            summary: Some("dup".to_string()),
            key_points: Some(vec!["p".to_string()]),
            resources: Some(vec![studytrack_api::models::TopicResource {
                title: "r".to_string(),
                link: "https://example.com".to_string(),
            }]),
            course: Some(course.id.clone()),
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    let err = env
        .topics()
        .create(&TopicInput {
            title: Some("Borrowing".to_string()),
            week: Some(2),
            summary: Some("s".to_string()),
            key_points: Some(vec![]),
            resources: Some(vec![studytrack_api::models::TopicResource {
                title: "r".to_string(),
                link: "https://example.com".to_string(),
            }]),
            course: Some(course.id.clone()),
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "Key points must be a non-empty array.");

    let err = env
        .topics()
        .create(&TopicInput {
            title: Some("Borrowing".to_string()),
            week: Some(2),
            summary: Some("s".to_string()),
            key_points: Some(vec!["p".to_string()]),
            resources: Some(vec![studytrack_api::models::TopicResource {
                title: "".to_string(),
                link: "https://example.com".to_string(),
            }]),
            course: Some(course.id.clone()),
        })
        .unwrap_err();
    assert!(err.to_string().contains("Resources must be an array"));

    let err = env
        .topics()
        .create(&TopicInput {
            title: Some("Borrowing".to_string()),
            week: Some(2),
            summary: Some("s".to_string()),
            key_points: Some(vec!["p".to_string()]),
            resources: Some(vec![studytrack_api::models::TopicResource {
                title: "r".to_string(),
                link: "https://example.com".to_string(),
            }]),
            course: Some("crs_missing".to_string()),
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid course ID: Course does not exist.");
}

#[test]
fn course_delete_refused_while_topics_remain() {
    let env = TestEnv::new();
    let course = env.create_course("Rust 101");
    let topic = env.create_topic(&course.id, "Ownership", 1);

    let err = env.courses().delete(&course.id).unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    env.topics().delete(&topic.id).unwrap();
    env.courses().delete(&course.id).unwrap();
    assert!(matches!(
        env.courses().get(&course.id).unwrap_err(),
        ApiError::NotFound(_)
    ));
}

#[test]
fn topic_delete_cascades_to_quizzes_and_exercises() {
    let env = TestEnv::new();
    let course = env.create_course("Rust 101");
    let topic = env.create_topic(&course.id, "Ownership", 1);
    let quiz = env.create_quiz(&topic.id, "Q?", &[("A", false), ("B", true)]);
    let exercise = env
        .exercises()
        .create(&exercise_input(&topic.id, "Borrow checker drills"))
        .unwrap();

    env.topics().delete(&topic.id).unwrap();

    assert!(matches!(
        env.quizzes().get(&quiz.id).unwrap_err(),
        ApiError::NotFound(_)
    ));
    assert!(matches!(
        env.exercises().get(&exercise.id).unwrap_err(),
        ApiError::NotFound(_)
    ));
}

#[test]
fn one_exercise_per_topic() {
    let env = TestEnv::new();
    let course = env.create_course("Rust 101");
    let topic = env.create_topic(&course.id, "Ownership", 1);
    env.exercises()
        .create(&exercise_input(&topic.id, "Drills"))
        .unwrap();

    let err = env
        .exercises()
        .create(&exercise_input(&topic.id, "More drills"))
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[test]
fn exercise_rejects_bad_difficulty_and_empty_questions() {
    let env = TestEnv::new();
    let course = env.create_course("Rust 101");
    let topic = env.create_topic(&course.id, "Ownership", 1);

    let mut input = exercise_input(&topic.id, "Drills");
    input.difficulty = Some("brutal".to_string());
    let err = env.exercises().create(&input).unwrap_err();
    assert!(err.to_string().contains("Invalid difficulty"));

    let mut input = exercise_input(&topic.id, "Drills");
    input.questions = Some(vec![]);
    let err = env.exercises().create(&input).unwrap_err();
    assert_eq!(err.to_string(), "At least one question is required.");
}

#[test]
fn exercise_list_filters_by_topic() {
    let env = TestEnv::new();
    let course = env.create_course("Rust 101");
    let t1 = env.create_topic(&course.id, "Ownership", 1);
    let t2 = env.create_topic(&course.id, "Borrowing", 2);
    env.exercises()
        .create(&exercise_input(&t1.id, "Drills A"))
        .unwrap();
    env.exercises()
        .create(&exercise_input(&t2.id, "Drills B"))
        .unwrap();

    assert_eq!(env.exercises().list(None).unwrap().len(), 2);
    let filtered = env.exercises().list(Some(&t1.id)).unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].title, "Drills A");
}

#[test]
fn empty_updates_are_rejected() {
    let env = TestEnv::new();
    let course = env.create_course("Rust 101");
    let topic = env.create_topic(&course.id, "Ownership", 1);

    let err = env
        .courses()
        .update(&course.id, &blank_course_input())
        .unwrap_err();
    assert_eq!(err.to_string(), "No update data provided.");

    let err = env
        .topics()
        .update(&topic.id, &blank_topic_input())
        .unwrap_err();
    assert_eq!(err.to_string(), "No update data provided.");
}

#[test]
fn update_trims_titles_before_the_uniqueness_check() {
    let env = TestEnv::new();
    env.create_course("Rust 101");
    let other = env.create_course("Rust 201");

    let err = env
        .courses()
        .update(
            &other.id,
            &CourseInput {
                title: Some("Rust 101 ".to_string()),
                ..blank_course_input()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    let updated = env
        .courses()
        .update(
            &other.id,
            &CourseInput {
                title: Some("  Rust 301  ".to_string()),
                ..blank_course_input()
            },
        )
        .unwrap();
    assert_eq!(updated.title, "Rust 301");

    env.create_topic(&other.id, "Ownership", 1);
    let t2 = env.create_topic(&other.id, "Borrowing", 2);
    let err = env
        .topics()
        .update(
            &t2.id,
            &TopicInput {
                title: Some("Ownership ".to_string()),
                ..blank_topic_input()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[test]
fn partial_course_update_keeps_other_fields() {
    let env = TestEnv::new();
    let course = env.create_course("Rust 101");

    let updated = env
        .courses()
        .update(
            &course.id,
            &CourseInput {
                semester: Some("2026F".to_string()),
                ..blank_course_input()
            },
        )
        .unwrap();

    assert_eq!(updated.semester, "2026F");
    assert_eq!(updated.title, "Rust 101");
    assert_eq!(updated.description, course.description);
}
