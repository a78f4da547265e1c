//! HTTP handlers for the `/sweets` routes

use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef, Query, State, rejection::QueryRejection},
    routing::{get, post, put},
};
use axum_helpers::{
    ApiResponse, AppError, AuthGate, Authenticated, RequireAdmin, UuidPath,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::SweetResult;
use crate::form::{JsonOrEmpty, SweetForm};
use crate::models::{
    NewSweet, RestockRequest, SearchQuery, SortOrder, Sweet, SweetUpdate,
};
use crate::repository::SweetRepository;
use crate::service::SweetService;

/// Upper bound for add/update bodies, images included
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// OpenAPI documentation for the sweets endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        list_sweets,
        search_sweets,
        add_sweet,
        update_sweet,
        delete_sweet,
        purchase_sweet,
        restock_sweet,
    ),
    components(
        schemas(Sweet, NewSweet, SweetUpdate, RestockRequest, SortOrder),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Sweets", description = "Inventory endpoints")
    )
)]
pub struct ApiDoc;

/// Router state: the ledger plus the gate used by the auth extractors
pub struct SweetsState<R: SweetRepository> {
    pub service: Arc<SweetService<R>>,
    pub gate: AuthGate,
}

impl<R: SweetRepository> Clone for SweetsState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            gate: self.gate.clone(),
        }
    }
}

impl<R: SweetRepository> FromRef<SweetsState<R>> for AuthGate {
    fn from_ref(state: &SweetsState<R>) -> Self {
        state.gate.clone()
    }
}

/// Create the sweets router. Mutating routes require a token; all but
/// purchase require the admin role.
pub fn router<R: SweetRepository + 'static>(service: SweetService<R>, gate: AuthGate) -> Router {
    let state = SweetsState {
        service: Arc::new(service),
        gate,
    };

    Router::new()
        .route("/", get(list_sweets).post(add_sweet))
        .route("/search", get(search_sweets))
        .route("/{id}", put(update_sweet).delete(delete_sweet))
        .route("/{id}/purchase", post(purchase_sweet))
        .route("/{id}/restock", post(restock_sweet))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// List all sweets
#[utoipa::path(
    get,
    path = "",
    tag = "Sweets",
    responses(
        (status = 200, description = "All sweets", body = Vec<Sweet>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_sweets<R: SweetRepository>(
    State(state): State<SweetsState<R>>,
) -> SweetResult<ApiResponse<Vec<Sweet>>> {
    let sweets = state.service.list_sweets().await?;
    Ok(ApiResponse::ok(sweets, "Sweets fetched successfully"))
}

/// Search sweets by name, category, price range or admin
#[utoipa::path(
    get,
    path = "/search",
    tag = "Sweets",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching sweets", body = Vec<Sweet>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_sweets<R: SweetRepository>(
    State(state): State<SweetsState<R>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<Sweet>>, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let sweets = state.service.search_sweets(query).await?;
    Ok(ApiResponse::ok(sweets, "Sweets fetched successfully"))
}

/// Add a sweet (admin)
///
/// Accepts JSON or `multipart/form-data` with an `image` file part.
#[utoipa::path(
    post,
    path = "",
    tag = "Sweets",
    request_body(content = NewSweet, content_type = "application/json"),
    responses(
        (status = 201, description = "Sweet added", body = Sweet),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn add_sweet<R: SweetRepository>(
    State(state): State<SweetsState<R>>,
    RequireAdmin(admin): RequireAdmin,
    form: SweetForm<NewSweet>,
) -> SweetResult<ApiResponse<Sweet>> {
    let sweet = state.service.add_sweet(form.data, form.image).await?;
    tracing::info!(sweet_id = %sweet.id, admin_id = %admin.id, "Sweet added");
    Ok(ApiResponse::created(sweet, "Sweet added successfully"))
}

/// Update a sweet (admin)
///
/// Accepts JSON or `multipart/form-data`; only provided fields change.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Sweets",
    params(
        ("id" = Uuid, Path, description = "Sweet ID")
    ),
    request_body(content = SweetUpdate, content_type = "application/json"),
    responses(
        (status = 200, description = "Sweet updated", body = Sweet),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn update_sweet<R: SweetRepository>(
    State(state): State<SweetsState<R>>,
    RequireAdmin(_admin): RequireAdmin,
    UuidPath(id): UuidPath,
    form: SweetForm<SweetUpdate>,
) -> SweetResult<ApiResponse<Sweet>> {
    let sweet = state.service.update_sweet(id, form.data, form.image).await?;
    Ok(ApiResponse::ok(sweet, "Sweet updated successfully"))
}

/// Delete a sweet (admin)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Sweets",
    params(
        ("id" = Uuid, Path, description = "Sweet ID")
    ),
    responses(
        (status = 200, description = "Sweet deleted; `data` holds the removed sweet", body = Sweet),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn delete_sweet<R: SweetRepository>(
    State(state): State<SweetsState<R>>,
    RequireAdmin(admin): RequireAdmin,
    UuidPath(id): UuidPath,
) -> SweetResult<ApiResponse<Sweet>> {
    let sweet = state.service.delete_sweet(id).await?;
    tracing::info!(sweet_id = %id, admin_id = %admin.id, "Sweet deleted");
    Ok(ApiResponse::ok(sweet, "Sweet deleted"))
}

/// Purchase one unit (any authenticated user)
#[utoipa::path(
    post,
    path = "/{id}/purchase",
    tag = "Sweets",
    params(
        ("id" = Uuid, Path, description = "Sweet ID")
    ),
    responses(
        (status = 200, description = "Purchased; quantity decremented by one", body = Sweet),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn purchase_sweet<R: SweetRepository>(
    State(state): State<SweetsState<R>>,
    Authenticated(user): Authenticated,
    UuidPath(id): UuidPath,
) -> SweetResult<ApiResponse<Sweet>> {
    let sweet = state.service.purchase(id).await?;
    tracing::info!(sweet_id = %id, user_id = %user.id, "Sweet purchased");
    Ok(ApiResponse::ok(sweet, "Sweet purchased successfully"))
}

/// Restock a sweet (admin)
#[utoipa::path(
    post,
    path = "/{id}/restock",
    tag = "Sweets",
    params(
        ("id" = Uuid, Path, description = "Sweet ID")
    ),
    request_body = RestockRequest,
    responses(
        (status = 200, description = "Restocked", body = Sweet),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn restock_sweet<R: SweetRepository>(
    State(state): State<SweetsState<R>>,
    RequireAdmin(_admin): RequireAdmin,
    UuidPath(id): UuidPath,
    JsonOrEmpty(input): JsonOrEmpty<RestockRequest>,
) -> SweetResult<ApiResponse<Sweet>> {
    let sweet = state.service.restock(id, input).await?;
    Ok(ApiResponse::ok(sweet, "Sweet restocked successfully"))
}
