use axum::{
    Json, Router,
    extract::State,
    routing::get,
};

use crate::{
    dto::restaurant::UpdateRestaurantRequest,
    error::AppResult,
    middleware::auth::AuthUser,
    models::Restaurant,
    response::ApiResponse,
    services::restaurant_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_restaurant).patch(update_restaurant))
        .route("/mine", get(get_my_restaurant))
}

#[utoipa::path(
    get,
    path = "/api/restaurant",
    responses(
        (status = 200, description = "Public restaurant profile", body = ApiResponse<Restaurant>),
        (status = 404, description = "No restaurant configured"),
    ),
    tag = "Restaurant"
)]
pub async fn get_restaurant(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Restaurant>>> {
    let resp = restaurant_service::get_public_restaurant(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/restaurant/mine",
    responses(
        (status = 200, description = "Restaurant administered by the caller", body = ApiResponse<Restaurant>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Restaurant"
)]
pub async fn get_my_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Restaurant>>> {
    let resp = restaurant_service::get_my_restaurant(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/restaurant",
    request_body = UpdateRestaurantRequest,
    responses(
        (status = 200, description = "Updated restaurant profile", body = ApiResponse<Restaurant>),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Validation failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Restaurant"
)]
pub async fn update_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateRestaurantRequest>,
) -> AppResult<Json<ApiResponse<Restaurant>>> {
    let resp = restaurant_service::update_restaurant(&state, &user, payload).await?;
    Ok(Json(resp))
}
