use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        dishes::{CreateDishRequest, DishList, UpdateDishRequest, UpdateDishStatusRequest},
        reorder::{MoveRequest, ReorderDishesRequest, ReorderOutcome},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Dish,
    response::ApiResponse,
    routes::params::DishQuery,
    services::dish_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_dishes).post(create_dish))
        .route("/order", put(reorder_dishes))
        .route("/move", post(move_dish))
        .route(
            "/{id}",
            get(get_dish).patch(update_dish).delete(delete_dish),
        )
        .route("/{id}/status", patch(set_dish_status))
}

#[utoipa::path(
    get,
    path = "/api/dishes",
    params(
        ("restaurant_id" = Option<Uuid>, Query, description = "Restaurant, defaults to the public one"),
        ("category_id" = Option<Uuid>, Query, description = "Only dishes of this category"),
        ("status" = Option<String>, Query, description = "Filter by status: active, inactive. Admins only, others always get active dishes"),
    ),
    responses(
        (status = 200, description = "Dishes in display order", body = ApiResponse<DishList>),
        (status = 401, description = "Authorization header present but invalid"),
    ),
    tag = "Dishes"
)]
pub async fn list_dishes(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Query(query): Query<DishQuery>,
) -> AppResult<Json<ApiResponse<DishList>>> {
    let resp = dish_service::list_dishes(&state, user.as_ref(), query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/dishes/{id}",
    params(
        ("id" = Uuid, Path, description = "Dish ID")
    ),
    responses(
        (status = 200, description = "Get dish", body = ApiResponse<Dish>),
        (status = 404, description = "Dish not found"),
    ),
    tag = "Dishes"
)]
pub async fn get_dish(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Dish>>> {
    let resp = dish_service::get_dish(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/dishes",
    request_body = CreateDishRequest,
    responses(
        (status = 201, description = "Dish appended to its category", body = ApiResponse<Dish>),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Validation failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Dishes"
)]
pub async fn create_dish(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateDishRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Dish>>)> {
    let resp = dish_service::create_dish(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/dishes/{id}",
    params(
        ("id" = Uuid, Path, description = "Dish ID")
    ),
    request_body = UpdateDishRequest,
    responses(
        (status = 200, description = "Updated dish", body = ApiResponse<Dish>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Dish not found"),
        (status = 422, description = "Validation failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Dishes"
)]
pub async fn update_dish(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDishRequest>,
) -> AppResult<Json<ApiResponse<Dish>>> {
    let resp = dish_service::update_dish(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/dishes/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Dish ID")
    ),
    request_body(content = Option<UpdateDishStatusRequest>, description = "Omit the body to toggle"),
    responses(
        (status = 200, description = "Dish listed or unlisted", body = ApiResponse<Dish>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Dish not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Dishes"
)]
pub async fn set_dish_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<UpdateDishStatusRequest>>,
) -> AppResult<Json<ApiResponse<Dish>>> {
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();
    let resp = dish_service::set_dish_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/dishes/{id}",
    params(
        ("id" = Uuid, Path, description = "Dish ID")
    ),
    responses(
        (status = 200, description = "Deleted dish"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Dish not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Dishes"
)]
pub async fn delete_dish(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = dish_service::delete_dish(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/dishes/order",
    request_body = ReorderDishesRequest,
    responses(
        (status = 200, description = "New dish order persisted", body = ApiResponse<ReorderOutcome>),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Ids do not match the dishes of the category"),
    ),
    security(("bearer_auth" = [])),
    tag = "Dishes"
)]
pub async fn reorder_dishes(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ReorderDishesRequest>,
) -> AppResult<Json<ApiResponse<ReorderOutcome>>> {
    let resp = dish_service::reorder_dishes(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/dishes/move",
    request_body = MoveRequest,
    responses(
        (status = 200, description = "Dish moved within its category", body = ApiResponse<ReorderOutcome>),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Target is not in the source's category"),
    ),
    security(("bearer_auth" = [])),
    tag = "Dishes"
)]
pub async fn move_dish(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<MoveRequest>,
) -> AppResult<Json<ApiResponse<ReorderOutcome>>> {
    let resp = dish_service::move_dish(&state, &user, payload).await?;
    Ok(Json(resp))
}
