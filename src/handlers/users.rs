//! /users endpoints
//!
//! Listing, role changes and deletion are admin-only; profile updates
//! are allowed for the user themselves or an admin.

use hyper::http::request::Parts;
use hyper::{Body, Response, StatusCode};

use super::{auth_header, json_body, json_response};
use crate::error::ApiResult;
use crate::models::{RegisterRequest, UpdateRoleRequest, UpdateUserRequest};
use crate::server::AppState;

pub fn list(state: &AppState, parts: &Parts) -> ApiResult<Response<Body>> {
    let auth = state.auth();
    let user = auth.authenticate(auth_header(parts))?;
    auth.require_admin(&user)?;

    json_response(StatusCode::OK, &state.users().list()?)
}

pub fn list_admins(state: &AppState, parts: &Parts) -> ApiResult<Response<Body>> {
    let auth = state.auth();
    let user = auth.authenticate(auth_header(parts))?;
    auth.require_admin(&user)?;

    json_response(StatusCode::OK, &state.users().list_admins()?)
}

/// Admin-side account creation. Same pipeline as self-registration but
/// behind the admin gate, so an explicit role can be handed out.
pub fn create(state: &AppState, parts: &Parts, body: &[u8]) -> ApiResult<Response<Body>> {
    let auth = state.auth();
    let user = auth.authenticate(auth_header(parts))?;
    auth.require_admin(&user)?;

    let req: RegisterRequest = json_body(body)?;
    json_response(StatusCode::CREATED, &auth.register(&req)?)
}

pub fn get(state: &AppState, parts: &Parts, id: &str) -> ApiResult<Response<Body>> {
    let auth = state.auth();
    let user = auth.authenticate(auth_header(parts))?;
    auth.require_admin(&user)?;

    json_response(StatusCode::OK, &state.users().get(id)?)
}

pub fn update(state: &AppState, parts: &Parts, body: &[u8], id: &str) -> ApiResult<Response<Body>> {
    let auth = state.auth();
    let user = auth.authenticate(auth_header(parts))?;
    auth.require_self_or_admin(&user, id)?;

    let req: UpdateUserRequest = json_body(body)?;
    json_response(StatusCode::OK, &state.users().update_profile(id, &req)?)
}

pub fn update_role(
    state: &AppState,
    parts: &Parts,
    body: &[u8],
    id: &str,
) -> ApiResult<Response<Body>> {
    let auth = state.auth();
    let user = auth.authenticate(auth_header(parts))?;
    auth.require_admin(&user)?;

    let req: UpdateRoleRequest = json_body(body)?;
    json_response(
        StatusCode::OK,
        &state.users().update_role(id, req.role.as_deref())?,
    )
}

pub fn delete(state: &AppState, parts: &Parts, id: &str) -> ApiResult<Response<Body>> {
    let auth = state.auth();
    let user = auth.authenticate(auth_header(parts))?;
    auth.require_admin(&user)?;

    state.users().delete(id)?;
    json_response(
        StatusCode::OK,
        &serde_json::json!({ "message": "User deleted successfully" }),
    )
}
