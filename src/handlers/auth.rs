//! /auth endpoints

use hyper::{Body, Response, StatusCode};

use super::{json_body, json_response};
use crate::error::ApiResult;
use crate::models::{LoginRequest, RegisterRequest};
use crate::server::AppState;

pub fn register(state: &AppState, body: &[u8]) -> ApiResult<Response<Body>> {
    let req: RegisterRequest = json_body(body)?;
    let user = state.auth().register(&req)?;
    json_response(StatusCode::CREATED, &serde_json::json!({ "user": user }))
}

pub fn login(state: &AppState, body: &[u8]) -> ApiResult<Response<Body>> {
    let req: LoginRequest = json_body(body)?;
    let response = state.auth().login(&req)?;
    json_response(StatusCode::OK, &response)
}
