//! /exercises endpoints

use hyper::http::request::Parts;
use hyper::{Body, Response, StatusCode, Uri};

use super::{auth_header, json_body, json_response, query_param};
use crate::error::ApiResult;
use crate::models::{ExerciseAttemptRequest, ExerciseInput};
use crate::server::AppState;

pub fn list(state: &AppState, uri: &Uri) -> ApiResult<Response<Body>> {
    let topic_id = query_param(uri, "topicId");
    json_response(StatusCode::OK, &state.exercises().list(topic_id)?)
}

pub fn get(state: &AppState, id: &str) -> ApiResult<Response<Body>> {
    json_response(StatusCode::OK, &state.exercises().get(id)?)
}

pub fn create(state: &AppState, parts: &Parts, body: &[u8]) -> ApiResult<Response<Body>> {
    let auth = state.auth();
    let user = auth.authenticate(auth_header(parts))?;
    auth.require_admin(&user)?;

    let input: ExerciseInput = json_body(body)?;
    json_response(StatusCode::CREATED, &state.exercises().create(&input)?)
}

pub fn update(state: &AppState, parts: &Parts, body: &[u8], id: &str) -> ApiResult<Response<Body>> {
    let auth = state.auth();
    let user = auth.authenticate(auth_header(parts))?;
    auth.require_admin(&user)?;

    let input: ExerciseInput = json_body(body)?;
    json_response(StatusCode::OK, &state.exercises().update(id, &input)?)
}

pub fn delete(state: &AppState, parts: &Parts, id: &str) -> ApiResult<Response<Body>> {
    let auth = state.auth();
    let user = auth.authenticate(auth_header(parts))?;
    auth.require_admin(&user)?;

    state.exercises().delete(id)?;
    json_response(
        StatusCode::OK,
        &serde_json::json!({ "message": "Exercise deleted successfully" }),
    )
}

pub fn attempt(
    state: &AppState,
    parts: &Parts,
    body: &[u8],
    id: &str,
) -> ApiResult<Response<Body>> {
    let user = state.auth().authenticate(auth_header(parts))?;
    let req: ExerciseAttemptRequest = json_body(body)?;
    let outcome = state.exercises().attempt(id, &user.id, &req)?;
    json_response(StatusCode::CREATED, &outcome)
}

pub fn user_attempts(state: &AppState, parts: &Parts, user_id: &str) -> ApiResult<Response<Body>> {
    state.auth().authenticate(auth_header(parts))?;
    json_response(StatusCode::OK, &state.exercises().user_attempts(user_id)?)
}
