//! HTTP handlers for the `/auth` routes

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, header},
    response::{AppendHeaders, IntoResponse},
    routing::post,
};
use axum_helpers::{
    ApiResponse, ValidatedJson,
    errors::responses::{BadRequestValidationResponse, ConflictResponse, InternalServerErrorResponse},
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{UserError, UserResult};
use crate::models::{AuthPayload, LoginRequest, RegisterRequest, Role, UserResponse};
use crate::repository::UserRepository;
use crate::service::UserService;

/// OpenAPI documentation for the auth endpoints
#[derive(OpenApi)]
#[openapi(
    paths(register, login),
    components(
        schemas(RegisterRequest, LoginRequest, AuthPayload, UserResponse, Role),
        responses(BadRequestValidationResponse, ConflictResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = "Auth", description = "Registration and login")
    )
)]
pub struct ApiDoc;

pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(Arc::new(service))
}

fn session_cookie<R: UserRepository>(
    service: &UserService<R>,
    token: &str,
) -> UserResult<AppendHeaders<[(header::HeaderName, HeaderValue); 1]>> {
    let cookie = HeaderValue::from_str(&service.tokens().cookie(token))
        .map_err(|e| UserError::Internal(format!("Failed to create cookie: {}", e)))?;
    Ok(AppendHeaders([(header::SET_COOKIE, cookie)]))
}

/// Register a new account
///
/// Also sets the `accessToken` cookie.
#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered; `data` holds the user and token", body = AuthPayload),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> UserResult<impl IntoResponse> {
    let payload = service.register(input).await?;
    let cookie = session_cookie(&service, &payload.token)?;
    Ok((
        cookie,
        ApiResponse::created(payload, "User registered successfully"),
    ))
}

/// Log in with email and password
///
/// Also sets the `accessToken` cookie.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; `data` holds the user and token", body = AuthPayload),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<impl IntoResponse> {
    let payload = service.login(input).await?;
    let cookie = session_cookie(&service, &payload.token)?;
    Ok((cookie, ApiResponse::ok(payload, "Login successful")))
}
