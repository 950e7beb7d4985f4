use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        categories::{CategoryDeleted, CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        reorder::{MoveRequest, ReorderCategoriesRequest, ReorderOutcome},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Category,
    response::ApiResponse,
    routes::params::CategoryQuery,
    services::category_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/order", put(reorder_categories))
        .route("/move", post(move_category))
        .route(
            "/{id}",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
}

#[utoipa::path(
    get,
    path = "/api/categories",
    params(
        ("restaurant_id" = Option<Uuid>, Query, description = "Restaurant, defaults to the public one"),
    ),
    responses(
        (status = 200, description = "Categories in display order", body = ApiResponse<CategoryList>)
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = category_service::list_categories(&state, query.restaurant_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Get category", body = ApiResponse<Category>),
        (status = 404, description = "Category not found"),
    ),
    tag = "Categories"
)]
pub async fn get_category(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::get_category(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category appended to the menu", body = ApiResponse<Category>),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Validation failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let resp = category_service::create_category(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Updated category", body = ApiResponse<Category>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::update_category(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Deleted category and its dishes", body = ApiResponse<CategoryDeleted>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CategoryDeleted>>> {
    let resp = category_service::delete_category(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/categories/order",
    request_body = ReorderCategoriesRequest,
    responses(
        (status = 200, description = "New category order persisted", body = ApiResponse<ReorderOutcome>),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Ids do not match the current categories"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn reorder_categories(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ReorderCategoriesRequest>,
) -> AppResult<Json<ApiResponse<ReorderOutcome>>> {
    let resp = category_service::reorder_categories(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/categories/move",
    request_body = MoveRequest,
    responses(
        (status = 200, description = "Category moved", body = ApiResponse<ReorderOutcome>),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Source or target is not a category of this restaurant"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn move_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<MoveRequest>,
) -> AppResult<Json<ApiResponse<ReorderOutcome>>> {
    let resp = category_service::move_category(&state, &user, payload).await?;
    Ok(Json(resp))
}
