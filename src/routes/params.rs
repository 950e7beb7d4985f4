use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::DishStatus;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CategoryQuery {
    pub restaurant_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DishQuery {
    /// Restaurant whose whole menu is listed when no category is given.
    pub restaurant_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub status: Option<DishStatus>,
}
