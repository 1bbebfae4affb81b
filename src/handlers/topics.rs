//! /topics endpoints (mutations admin-gated)

use hyper::http::request::Parts;
use hyper::{Body, Response, StatusCode};

use super::{auth_header, json_body, json_response};
use crate::error::ApiResult;
use crate::models::TopicInput;
use crate::server::AppState;

pub fn list(state: &AppState) -> ApiResult<Response<Body>> {
    json_response(StatusCode::OK, &state.topics().list()?)
}

pub fn get(state: &AppState, id: &str) -> ApiResult<Response<Body>> {
    json_response(StatusCode::OK, &state.topics().get(id)?)
}

pub fn create(state: &AppState, parts: &Parts, body: &[u8]) -> ApiResult<Response<Body>> {
    let auth = state.auth();
    let user = auth.authenticate(auth_header(parts))?;
    auth.require_admin(&user)?;

    let input: TopicInput = json_body(body)?;
    json_response(StatusCode::CREATED, &state.topics().create(&input)?)
}

pub fn update(state: &AppState, parts: &Parts, body: &[u8], id: &str) -> ApiResult<Response<Body>> {
    let auth = state.auth();
    let user = auth.authenticate(auth_header(parts))?;
    auth.require_admin(&user)?;

    let input: TopicInput = json_body(body)?;
    json_response(StatusCode::OK, &state.topics().update(id, &input)?)
}

pub fn delete(state: &AppState, parts: &Parts, id: &str) -> ApiResult<Response<Body>> {
    let auth = state.auth();
    let user = auth.authenticate(auth_header(parts))?;
    auth.require_admin(&user)?;

    state.topics().delete(id)?;
    json_response(
        StatusCode::OK,
        &serde_json::json!({ "message": "Topic deleted successfully" }),
    )
}
