use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};

use crate::{
    dto::{normalize_optional, restaurant::UpdateRestaurantRequest},
    entity::restaurants::{ActiveModel, Column, Entity as Restaurants, Model as RestaurantModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, resolve_admin},
    models::Restaurant,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// The deployment serves a single restaurant: the oldest row.
pub async fn first_restaurant(state: &AppState) -> AppResult<Option<RestaurantModel>> {
    let restaurant = Restaurants::find()
        .order_by_asc(Column::CreatedAt)
        .one(&state.orm)
        .await?;
    Ok(restaurant)
}

pub async fn get_public_restaurant(state: &AppState) -> AppResult<ApiResponse<Restaurant>> {
    let restaurant = first_restaurant(state).await?.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Restaurant",
        Restaurant::from(restaurant),
        None,
    ))
}

pub async fn get_my_restaurant(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Restaurant>> {
    let admin = resolve_admin(state, user).await?;
    let restaurant = Restaurants::find_by_id(admin.restaurant_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Restaurant",
        Restaurant::from(restaurant),
        None,
    ))
}

pub async fn update_restaurant(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateRestaurantRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    payload.validate()?;
    let admin = resolve_admin(state, user).await?;

    let existing = Restaurants::find_by_id(admin.restaurant_id)
        .one(&state.orm)
        .await?;
    let existing = match existing {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.clone().into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(normalize_optional(Some(description)));
    }
    if let Some(banner_image) = payload.banner_image {
        active.banner_image = Set(normalize_optional(Some(banner_image)));
    }
    if let Some(address) = payload.address {
        active.address = Set(normalize_optional(Some(address)));
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(normalize_optional(Some(phone)));
    }
    if let Some(business_hours) = payload.business_hours {
        active.business_hours = Set(normalize_optional(Some(business_hours)));
    }
    if let Some(links) = payload.social_links {
        let links = if links.is_empty() {
            None
        } else {
            Some(serde_json::to_value(links).map_err(anyhow::Error::from)?)
        };
        active.social_links = Set(links);
    }

    if !active.is_changed() {
        return Ok(ApiResponse::success(
            "Unchanged",
            Restaurant::from(existing),
            Some(Meta::empty()),
        ));
    }

    let restaurant = active.update(&state.orm).await?;
    tracing::info!(restaurant_id = %restaurant.id, user_id = %user.user_id, "restaurant updated");

    Ok(ApiResponse::success(
        "Updated",
        Restaurant::from(restaurant),
        Some(Meta::empty()),
    ))
}
