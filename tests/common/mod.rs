#![allow(dead_code)]

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use menu_admin_api::{
    config::AppConfig,
    dto::{categories::CreateCategoryRequest, dishes::CreateDishRequest},
    entity::{
        Categories, Dishes, Restaurants, UserRoles, restaurants::ActiveModel as RestaurantActive,
        user_roles::ActiveModel as RoleActive,
    },
    middleware::auth::{AuthUser, Claims, ROLE_ADMIN},
    models::{Category, Dish},
    scope::Scope,
    services::{category_service, dish_service},
    state::AppState,
};
use sea_orm::{ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, Schema, Set};
use uuid::Uuid;

pub const TEST_SECRET: &str = "menu-test-secret";

/// Fresh in-memory store with the schema derived from the entities.
pub async fn setup_state() -> anyhow::Result<AppState> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let orm = Database::connect(options).await?;

    let backend = orm.get_database_backend();
    let schema = Schema::new(backend);
    for stmt in [
        schema.create_table_from_entity(Restaurants),
        schema.create_table_from_entity(UserRoles),
        schema.create_table_from_entity(Categories),
        schema.create_table_from_entity(Dishes),
    ] {
        orm.execute(backend.build(&stmt)).await?;
    }

    let config = AppConfig {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: TEST_SECRET.into(),
        view_cache_capacity: 16,
    };
    Ok(AppState::new(orm, config))
}

pub async fn seed_restaurant(state: &AppState, name: &str) -> anyhow::Result<Uuid> {
    let restaurant = RestaurantActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.into()),
        description: Set(None),
        banner_image: Set(None),
        address: Set(None),
        phone: Set(None),
        business_hours: Set(None),
        social_links: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(restaurant.id)
}

/// Link a new principal to `restaurant_id` with `role`.
pub async fn grant(state: &AppState, restaurant_id: Uuid, role: &str) -> anyhow::Result<AuthUser> {
    let user_id = Uuid::new_v4();
    RoleActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        restaurant_id: Set(restaurant_id),
        role: Set(role.into()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(AuthUser { user_id })
}

pub async fn admin_of(state: &AppState, restaurant_id: Uuid) -> anyhow::Result<AuthUser> {
    grant(state, restaurant_id, ROLE_ADMIN).await
}

pub fn token_for(user: &AuthUser) -> String {
    let claims = Claims {
        sub: user.user_id.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
        email: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("sign test token")
}

pub async fn add_category(
    state: &AppState,
    admin: &AuthUser,
    name: &str,
) -> anyhow::Result<Category> {
    let resp = category_service::create_category(
        state,
        admin,
        CreateCategoryRequest {
            name: name.into(),
            description: None,
            icon: None,
        },
    )
    .await?;
    Ok(resp.data.expect("category"))
}

pub async fn add_dish(
    state: &AppState,
    admin: &AuthUser,
    category_id: Uuid,
    title: &str,
) -> anyhow::Result<Dish> {
    let resp = dish_service::create_dish(
        state,
        admin,
        CreateDishRequest {
            category_id,
            title: title.into(),
            description: None,
            price: 2500,
            image: format!("https://cdn.example.com/{title}.jpg"),
            status: None,
        },
    )
    .await?;
    Ok(resp.data.expect("dish"))
}

/// `(id, sort_order)` pairs of a category's dishes in display order.
pub async fn dish_positions(
    state: &AppState,
    category_id: Uuid,
) -> anyhow::Result<Vec<(Uuid, i32)>> {
    let dishes = dish_service::load_dishes(state, Scope::Category(category_id)).await?;
    Ok(dishes.into_iter().map(|d| (d.id, d.sort_order)).collect())
}

pub async fn category_positions(
    state: &AppState,
    restaurant_id: Uuid,
) -> anyhow::Result<Vec<(Uuid, i32)>> {
    let categories = category_service::load_categories(state, restaurant_id).await?;
    Ok(categories.into_iter().map(|c| (c.id, c.sort_order)).collect())
}
