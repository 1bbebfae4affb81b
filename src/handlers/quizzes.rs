//! /quizzes endpoints
//!
//! Reads are public; attempts and progress views require a valid token;
//! definition changes are admin-only. Attempts are always logged against
//! the authenticated caller, never a user id from the body.

use hyper::http::request::Parts;
use hyper::{Body, Response, StatusCode};

use super::{auth_header, json_body, json_response};
use crate::error::ApiResult;
use crate::models::{QuizAttemptRequest, QuizInput};
use crate::server::AppState;

pub fn list(state: &AppState) -> ApiResult<Response<Body>> {
    json_response(StatusCode::OK, &state.quizzes().list()?)
}

pub fn get(state: &AppState, id: &str) -> ApiResult<Response<Body>> {
    json_response(StatusCode::OK, &state.quizzes().get(id)?)
}

pub fn list_by_topic(state: &AppState, topic_id: &str) -> ApiResult<Response<Body>> {
    json_response(StatusCode::OK, &state.quizzes().list_by_topic(topic_id)?)
}

pub fn create(state: &AppState, parts: &Parts, body: &[u8]) -> ApiResult<Response<Body>> {
    let auth = state.auth();
    let user = auth.authenticate(auth_header(parts))?;
    auth.require_admin(&user)?;

    let input: QuizInput = json_body(body)?;
    json_response(StatusCode::CREATED, &state.quizzes().create(&input)?)
}

pub fn update(state: &AppState, parts: &Parts, body: &[u8], id: &str) -> ApiResult<Response<Body>> {
    let auth = state.auth();
    let user = auth.authenticate(auth_header(parts))?;
    auth.require_admin(&user)?;

    let input: QuizInput = json_body(body)?;
    json_response(StatusCode::OK, &state.quizzes().update(id, &input)?)
}

pub fn delete(state: &AppState, parts: &Parts, id: &str) -> ApiResult<Response<Body>> {
    let auth = state.auth();
    let user = auth.authenticate(auth_header(parts))?;
    auth.require_admin(&user)?;

    state.quizzes().delete(id)?;
    json_response(
        StatusCode::OK,
        &serde_json::json!({ "message": "Quiz deleted successfully" }),
    )
}

pub fn attempt(state: &AppState, parts: &Parts, body: &[u8], id: &str) -> ApiResult<Response<Body>> {
    let user = state.auth().authenticate(auth_header(parts))?;
    let req: QuizAttemptRequest = json_body(body)?;
    let outcome = state.quizzes().attempt(id, &user.id, &req)?;
    json_response(StatusCode::CREATED, &outcome)
}

pub fn user_attempts(state: &AppState, parts: &Parts, user_id: &str) -> ApiResult<Response<Body>> {
    state.auth().authenticate(auth_header(parts))?;
    json_response(StatusCode::OK, &state.quizzes().user_attempts(user_id)?)
}

pub fn user_progress(
    state: &AppState,
    parts: &Parts,
    user_id: &str,
    course_id: &str,
) -> ApiResult<Response<Body>> {
    state.auth().authenticate(auth_header(parts))?;
    json_response(
        StatusCode::OK,
        &state.quizzes().user_progress(user_id, course_id)?,
    )
}
