//! Request handlers and the routing table
//!
//! Handlers decode the body, run the auth gate their route requires and
//! delegate to a service; every error propagates to the boundary in
//! `server`.

pub mod auth;
pub mod courses;
pub mod exercises;
pub mod progress;
pub mod quizzes;
pub mod topics;
pub mod users;

use hyper::header::{CONTENT_TYPE, AUTHORIZATION};
use hyper::http::request::Parts;
use hyper::{Body, Method, Response, StatusCode, Uri};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::server::AppState;

/// Routing table: method + path segments (relative to `/api`).
/// Literal arms must precede same-arity parameter arms.
pub fn route(
    state: &AppState,
    parts: &Parts,
    body: &[u8],
    segments: &[&str],
) -> ApiResult<Response<Body>> {
    match (&parts.method, segments) {
        (&Method::GET, ["health"]) => {
            json_response(StatusCode::OK, &serde_json::json!({ "status": "ok" }))
        }

        // Auth
        (&Method::POST, ["auth", "register"]) => auth::register(state, body),
        (&Method::POST, ["auth", "login"]) => auth::login(state, body),

        // Courses
        (&Method::GET, ["courses"]) => courses::list(state),
        (&Method::POST, ["courses"]) => courses::create(state, parts, body),
        (&Method::GET, ["courses", id]) => courses::get(state, id),
        (&Method::PUT, ["courses", id]) => courses::update(state, parts, body, id),
        (&Method::DELETE, ["courses", id]) => courses::delete(state, parts, id),

        // Topics
        (&Method::GET, ["topics"]) => topics::list(state),
        (&Method::POST, ["topics"]) => topics::create(state, parts, body),
        (&Method::GET, ["topics", id]) => topics::get(state, id),
        (&Method::PUT, ["topics", id]) => topics::update(state, parts, body, id),
        (&Method::DELETE, ["topics", id]) => topics::delete(state, parts, id),

        // Quizzes
        (&Method::GET, ["quizzes"]) => quizzes::list(state),
        (&Method::POST, ["quizzes"]) => quizzes::create(state, parts, body),
        (&Method::GET, ["quizzes", "topic", topic_id]) => quizzes::list_by_topic(state, topic_id),
        (&Method::GET, ["quizzes", "attempts", user_id]) => {
            quizzes::user_attempts(state, parts, user_id)
        }
        (&Method::GET, ["quizzes", "progress", user_id, course_id]) => {
            quizzes::user_progress(state, parts, user_id, course_id)
        }
        (&Method::POST, ["quizzes", id, "attempt"]) => quizzes::attempt(state, parts, body, id),
        (&Method::GET, ["quizzes", id]) => quizzes::get(state, id),
        (&Method::PUT, ["quizzes", id]) => quizzes::update(state, parts, body, id),
        (&Method::DELETE, ["quizzes", id]) => quizzes::delete(state, parts, id),

        // Exercises
        (&Method::GET, ["exercises"]) => exercises::list(state, &parts.uri),
        (&Method::POST, ["exercises"]) => exercises::create(state, parts, body),
        (&Method::GET, ["exercises", "attempts", user_id]) => {
            exercises::user_attempts(state, parts, user_id)
        }
        (&Method::POST, ["exercises", id, "attempt"]) => {
            exercises::attempt(state, parts, body, id)
        }
        (&Method::GET, ["exercises", id]) => exercises::get(state, id),
        (&Method::PUT, ["exercises", id]) => exercises::update(state, parts, body, id),
        (&Method::DELETE, ["exercises", id]) => exercises::delete(state, parts, id),

        // Progress log
        (&Method::GET, ["progress"]) => progress::list(state),
        (&Method::POST, ["progress"]) => progress::create(state, body),
        (&Method::GET, ["progress", user_id]) => progress::for_user(state, user_id),

        // Users
        (&Method::GET, ["users"]) => users::list(state, parts),
        (&Method::POST, ["users"]) => users::create(state, parts, body),
        (&Method::GET, ["users", "admins"]) => users::list_admins(state, parts),
        (&Method::GET, ["users", id]) => users::get(state, parts, id),
        (&Method::PUT, ["users", id, "role"]) => users::update_role(state, parts, body, id),
        (&Method::PUT, ["users", id]) => users::update(state, parts, body, id),
        (&Method::DELETE, ["users", id]) => users::delete(state, parts, id),

        _ => Err(ApiError::not_found("Not found")),
    }
}

pub(crate) fn json_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    if body.is_empty() {
        return Err(ApiError::validation("Missing request body"));
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::validation(format!("Invalid JSON body: {}", e)))
}

pub(crate) fn json_response<T: Serialize>(
    status: StatusCode,
    value: &T,
) -> ApiResult<Response<Body>> {
    let payload = serde_json::to_string(value)?;
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(payload))
        .map_err(|e| ApiError::Internal(format!("response build failed: {}", e)))
}

pub(crate) fn auth_header(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

/// Value of a query parameter, e.g. `?topicId=top_1`.
pub(crate) fn query_param<'a>(uri: &'a Uri, name: &str) -> Option<&'a str> {
    uri.query()?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}
