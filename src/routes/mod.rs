use axum::Router;

use crate::state::AppState;

pub mod categories;
pub mod dishes;
pub mod doc;
pub mod health;
pub mod params;
pub mod restaurant;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/restaurant", restaurant::router())
        .nest("/categories", categories::router())
        .nest("/dishes", dishes::router())
}
