//! /progress endpoints
//!
//! Served without authentication: the views are part of the public read
//! surface and the raw log write shares that surface.

use hyper::{Body, Response, StatusCode};

use super::{json_body, json_response};
use crate::error::ApiResult;
use crate::models::ProgressLogInput;
use crate::server::AppState;

pub fn list(state: &AppState) -> ApiResult<Response<Body>> {
    json_response(StatusCode::OK, &state.progress().list_all()?)
}

pub fn for_user(state: &AppState, user_id: &str) -> ApiResult<Response<Body>> {
    json_response(StatusCode::OK, &state.progress().for_user(user_id)?)
}

pub fn create(state: &AppState, body: &[u8]) -> ApiResult<Response<Body>> {
    let input: ProgressLogInput = json_body(body)?;
    json_response(StatusCode::CREATED, &state.progress().log(&input)?)
}
