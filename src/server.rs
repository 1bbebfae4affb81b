//! HTTP server
//!
//! hyper service wired to the routing table in `handlers`; the single
//! error boundary lives here and renders every `ApiError` as
//! `{"error": <message>}` with the variant's status.

use std::sync::Arc;

use anyhow::Result;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::database::Database;
use crate::error::ApiError;
use crate::handlers;
use crate::services::{
    AuthService, CourseService, ExerciseService, ProgressService, QuizService, TopicService,
    UserService,
};

/// Shared per-process state handed to every handler.
pub struct AppState {
    pub db: Arc<Database>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let db = Arc::new(Database::open(&config.database_path)?);
        Ok(AppState { db, config })
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(
            self.db.clone(),
            self.config.jwt_secret.clone(),
            self.config.bcrypt_cost,
        )
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.db.clone())
    }

    pub fn courses(&self) -> CourseService {
        CourseService::new(self.db.clone())
    }

    pub fn topics(&self) -> TopicService {
        TopicService::new(self.db.clone())
    }

    pub fn quizzes(&self) -> QuizService {
        QuizService::new(self.db.clone())
    }

    pub fn exercises(&self) -> ExerciseService {
        ExerciseService::new(self.db.clone())
    }

    pub fn progress(&self) -> ProgressService {
        ProgressService::new(self.db.clone())
    }
}

/// Bind and run the server until the process is stopped.
pub async fn serve(config: AppConfig) -> Result<()> {
    let addr = config.bind_addr;
    let state = Arc::new(AppState::new(config)?);

    let make_svc = make_service_fn(move |_conn| {
        let state = state.clone();
        async move {
            Ok::<_, hyper::Error>(service_fn(move |req| {
                let state = state.clone();
                async move { Ok::<_, hyper::Error>(handle_request(state, req).await) }
            }))
        }
    });

    info!("[Server] Listening on http://{}", addr);
    Server::bind(&addr).serve(make_svc).await?;
    Ok(())
}

async fn handle_request(state: Arc<AppState>, req: Request<Body>) -> Response<Body> {
    let origin = state.config.cors_origin.clone();

    if req.method() == Method::OPTIONS {
        return with_cors(preflight_response(), &origin);
    }

    let response = match dispatch(&state, req).await {
        Ok(response) => response,
        Err(err) => error_response(&err),
    };
    with_cors(response, &origin)
}

async fn dispatch(state: &AppState, req: Request<Body>) -> Result<Response<Body>, ApiError> {
    let (parts, body) = req.into_parts();
    let body = hyper::body::to_bytes(body)
        .await
        .map_err(|e| ApiError::validation(format!("failed to read request body: {}", e)))?;

    let segments = path_segments(parts.uri.path());
    handlers::route(state, &parts, &body, &segments)
}

/// Segments of the request path with the `/api` prefix stripped.
fn path_segments(path: &str) -> Vec<&str> {
    let rel = path.strip_prefix("/api").unwrap_or(path);
    rel.split('/').filter(|s| !s.is_empty()).collect()
}

/// The one place errors become HTTP. Server faults log the detail and
/// send a generic message; everything else sends its own message.
fn error_response(err: &ApiError) -> Response<Body> {
    let status = err.status();
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("[Server] Internal error: {}", err);
    }
    let payload = serde_json::json!({ "error": err.public_message() });
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap_or_else(|_| Response::new(Body::from("{\"error\":\"internal\"}")))
}

fn preflight_response() -> Response<Body> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .body(Body::empty())
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

fn with_cors(mut response: Response<Body>, origin: &str) -> Response<Body> {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Authorization, Content-Type"),
    );
    response
}
